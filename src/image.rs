//! Opaque image and collection handles.
//!
//! An [`Image`] never holds pixels. It carries identity, the current band
//! schema, a property bag, and an ordered list of deferred [`ImageOp`]s that
//! the archive service executes when a materializing call (download or export
//! submission) forces evaluation. Schema bookkeeping happens locally so band
//! errors surface before any network round-trip.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sensors::Sensor;
use crate::types::{BoundingBox, Geometry, LandError, LandResult};

/// One deferred per-pixel operation, serialized to the service verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ImageOp {
    /// Mask out pixels where any of `bits` of `band` reads non-zero.
    QaBitMask { band: String, bits: Vec<u8> },
    /// `value * scale + offset` over bands matching the native pattern,
    /// replacing them in place.
    LinearScale {
        pattern: String,
        scale: f64,
        offset: f64,
    },
    /// Select `bands` and rename them to `rename` (same length, same order).
    Select { bands: Vec<String>, rename: Vec<String> },
    /// Append `(first - second) / (first + second)` as band `name`.
    NormalizedDifference {
        first: String,
        second: String,
        name: String,
    },
    /// Restrict pixels to the given geometry.
    Clip { geometry: Geometry },
    /// Render to an 8-bit visualization raster.
    Visualize { params: VisParams },
}

/// Visualization parameters for rendered exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisParams {
    pub bands: Vec<String>,
    pub min: f64,
    pub max: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<String>>,
}

/// System properties that every transform must hand through.
///
/// The remote engine rebuilds the image object on masking and band
/// replacement and drops these; transform constructors here mirror that, and
/// [`Image::preserving_properties`] re-attaches them. Pipeline stages apply
/// the wrapper uniformly so the contract is a post-condition, not a
/// per-function afterthought.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageProperties {
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
    pub footprint: Option<Geometry>,
    pub cloud_cover: Option<f32>,
    /// Archive properties we carry but do not interpret.
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Opaque handle to one acquired scene plus its deferred processing chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    id: String,
    sensor: Sensor,
    bands: Vec<String>,
    properties: ImageProperties,
    ops: Vec<ImageOp>,
}

impl Image {
    pub fn new(
        id: impl Into<String>,
        sensor: Sensor,
        bands: Vec<String>,
        properties: ImageProperties,
    ) -> Image {
        Image {
            id: id.into(),
            sensor,
            bands,
            properties,
            ops: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sensor(&self) -> Sensor {
        self.sensor
    }

    /// Current band schema, tracked through every deferred operation.
    pub fn band_names(&self) -> &[String] {
        &self.bands
    }

    pub fn has_band(&self, name: &str) -> bool {
        self.bands.iter().any(|band| band == name)
    }

    pub fn properties(&self) -> &ImageProperties {
        &self.properties
    }

    pub fn acquisition_time(&self) -> Option<DateTime<Utc>> {
        self.properties.time_start
    }

    pub fn footprint(&self) -> Option<&Geometry> {
        self.properties.footprint.as_ref()
    }

    /// Deferred operation chain, in application order.
    pub fn ops(&self) -> &[ImageOp] {
        &self.ops
    }

    fn push_op(&self, op: ImageOp) -> Image {
        let mut next = self.clone();
        next.ops.push(op);
        next
    }

    /// Like the remote engine, masking constructs a new image whose system
    /// properties are gone. Callers re-attach them via
    /// [`Image::preserving_properties`].
    pub fn update_mask_from_qa(&self, qa_band: &str, bits: Vec<u8>) -> Image {
        let mut next = self.push_op(ImageOp::QaBitMask {
            band: qa_band.to_string(),
            bits,
        });
        next.properties = ImageProperties {
            extra: std::mem::take(&mut next.properties.extra),
            ..ImageProperties::default()
        };
        next
    }

    /// In-place band replacement; also rebuilds the image and drops system
    /// properties.
    pub fn scale_bands(&self, pattern: &str, scale: f64, offset: f64) -> Image {
        let mut next = self.push_op(ImageOp::LinearScale {
            pattern: pattern.to_string(),
            scale,
            offset,
        });
        next.properties = ImageProperties {
            extra: std::mem::take(&mut next.properties.extra),
            ..ImageProperties::default()
        };
        next
    }

    /// Select `bands` and rename to `rename`. Fails locally when a requested
    /// band is absent from the current schema.
    pub fn select(&self, bands: &[&str], rename: &[&str]) -> LandResult<Image> {
        debug_assert_eq!(bands.len(), rename.len());
        for band in bands {
            if !self.has_band(band) {
                return Err(LandError::BandNotFound(format!(
                    "{} has no band {}",
                    self.id, band
                )));
            }
        }
        let mut next = self.push_op(ImageOp::Select {
            bands: bands.iter().map(|b| b.to_string()).collect(),
            rename: rename.iter().map(|b| b.to_string()).collect(),
        });
        next.bands = rename.iter().map(|b| b.to_string()).collect();
        Ok(next)
    }

    /// Append a normalized-difference band. Fails locally when either input
    /// band is absent.
    pub fn normalized_difference(
        &self,
        first: &str,
        second: &str,
        name: &str,
    ) -> LandResult<Image> {
        for band in [first, second] {
            if !self.has_band(band) {
                return Err(LandError::BandNotFound(format!(
                    "{} has no band {}",
                    self.id, band
                )));
            }
        }
        let mut next = self.push_op(ImageOp::NormalizedDifference {
            first: first.to_string(),
            second: second.to_string(),
            name: name.to_string(),
        });
        next.bands.push(name.to_string());
        Ok(next)
    }

    pub fn clip(&self, geometry: Geometry) -> Image {
        self.push_op(ImageOp::Clip { geometry })
    }

    /// Render to an 8-bit visualization raster. All `params.bands` must be
    /// present in the current schema.
    pub fn visualize(&self, params: VisParams) -> LandResult<Image> {
        for band in &params.bands {
            if !self.has_band(band) {
                return Err(LandError::BandNotFound(format!(
                    "{} has no band {}",
                    self.id, band
                )));
            }
        }
        Ok(self.push_op(ImageOp::Visualize { params }))
    }

    /// Re-attach `time_start`/`time_end`/`footprint` from `source`. Applied
    /// after every destructive transform stage.
    pub fn preserving_properties(mut self, source: &Image) -> Image {
        self.properties.time_start = source.properties.time_start;
        self.properties.time_end = source.properties.time_end;
        self.properties.footprint = source.properties.footprint.clone();
        self
    }
}

/// A set of images: unordered as returned by an archive query, strictly
/// ordered by acquisition time after the merge stage.
#[derive(Debug, Clone, Default)]
pub struct ImageCollection {
    images: Vec<Image>,
}

impl ImageCollection {
    pub fn new(images: Vec<Image>) -> ImageCollection {
        ImageCollection { images }
    }

    pub fn size(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn into_images(self) -> Vec<Image> {
        self.images
    }

    pub fn map<F>(self, mut f: F) -> ImageCollection
    where
        F: FnMut(&Image) -> Image,
    {
        ImageCollection {
            images: self.images.iter().map(|img| f(img)).collect(),
        }
    }

    pub fn try_map<F>(self, mut f: F) -> LandResult<ImageCollection>
    where
        F: FnMut(&Image) -> LandResult<Image>,
    {
        let images = self
            .images
            .iter()
            .map(|img| f(img))
            .collect::<LandResult<Vec<_>>>()?;
        Ok(ImageCollection { images })
    }

    /// Union bounding box of every footprint, the collection-level geometry
    /// used as the asset export region.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.images
            .iter()
            .filter_map(|img| img.footprint().map(Geometry::bounding_box))
            .reduce(|acc, bounds| acc.union(&bounds))
    }
}
