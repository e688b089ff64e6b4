//! Injectable session against the imagery archive service.
//!
//! Filtering, pixel algebra, mask application, rendering and export all
//! execute remotely; this trait is the seam the pipeline composes calls
//! through. Every method is a blocking synchronous round-trip from the
//! caller's viewpoint. Tests substitute an in-memory implementation.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::image::Image;
use crate::types::{Geometry, LandResult, TimeRange};

/// Filter parameters of one archive query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Half-open acquisition window.
    pub time_range: TimeRange,
    /// Scenes must intersect this region.
    pub region: Geometry,
    /// Ceiling on the per-scene cloud-cover attribute, percent.
    pub max_cloud_cover: f32,
}

/// Catalog entry returned by a search; everything needed to build an
/// [`Image`] handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub id: String,
    pub time_start: DateTime<Utc>,
    #[serde(default)]
    pub time_end: Option<DateTime<Utc>>,
    pub footprint: Geometry,
    pub cloud_cover: f32,
    /// Native band codes as stored in the archive.
    pub bands: Vec<String>,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

/// Local raster download of one (possibly rendered) image.
#[derive(Debug)]
pub struct DownloadRequest<'a> {
    pub image: &'a Image,
    pub region: Geometry,
    pub crs: String,
    /// Meters per pixel.
    pub scale: u32,
    pub destination: &'a Path,
}

/// Asynchronous server-side export into the archive's own storage.
#[derive(Debug)]
pub struct AssetExportRequest<'a> {
    pub image: &'a Image,
    /// Full destination path, `<asset root>/<scene name>`.
    pub asset_id: String,
    pub description: String,
    pub region: Geometry,
    /// Meters per pixel.
    pub scale: u32,
    pub max_pixels: u64,
}

/// Opaque handle of a submitted asset export job. The pipeline never polls
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTaskId(pub String);

impl std::fmt::Display for ExportTaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session with the imagery archive/compute service.
pub trait ArchiveService {
    /// Query one sensor archive for scenes matching the filters, retaining
    /// original per-scene properties.
    fn search(&self, archive: &str, query: &SearchQuery) -> LandResult<Vec<ImageDescriptor>>;

    /// Materialize an image (with its deferred op chain) into a local
    /// GeoTIFF.
    fn download(&self, request: &DownloadRequest<'_>) -> LandResult<()>;

    /// Submit an asset export job. Fire-and-forget: the returned task id is
    /// logged, never polled.
    fn export_to_asset(&self, request: &AssetExportRequest<'_>) -> LandResult<ExportTaskId>;
}

impl Image {
    /// Build the local handle for a catalog entry of the given sensor.
    pub fn from_descriptor(
        sensor: crate::sensors::Sensor,
        descriptor: ImageDescriptor,
    ) -> Image {
        let properties = crate::image::ImageProperties {
            time_start: Some(descriptor.time_start),
            time_end: descriptor.time_end,
            footprint: Some(descriptor.footprint),
            cloud_cover: Some(descriptor.cloud_cover),
            extra: descriptor.properties,
        };
        Image::new(descriptor.id, sensor, descriptor.bands, properties)
    }
}
