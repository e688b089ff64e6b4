//! Multi-sensor merge and the ordered snapshot.
//!
//! The five processed streams are unioned and sorted ascending by
//! acquisition time. Images sharing a timestamp across sensors order by
//! sensor generation (newest first), then by image id, so the merged order
//! is fully deterministic.
//!
//! Footprint resolution and the export loop must read the same ordered list;
//! [`CollectionSnapshot`] captures it once right after the merge and both
//! consumers index into it.

use std::cmp::Ordering;

use crate::image::{Image, ImageCollection};
use crate::types::{BoundingBox, Geometry, LandError, LandResult};

/// Union the processed per-sensor collections into one chronologically
/// ordered collection.
pub fn merge_collections(parts: Vec<ImageCollection>) -> ImageCollection {
    let mut images: Vec<Image> = parts
        .into_iter()
        .flat_map(ImageCollection::into_images)
        .collect();
    images.sort_by(compare_images);
    ImageCollection::new(images)
}

fn compare_images(a: &Image, b: &Image) -> Ordering {
    a.acquisition_time()
        .cmp(&b.acquisition_time())
        .then_with(|| a.sensor().priority().cmp(&b.sensor().priority()))
        .then_with(|| a.id().cmp(b.id()))
}

/// One materialized view of the merged collection, shared by footprint
/// resolution and the export loop so their indices can never drift apart.
#[derive(Debug, Clone)]
pub struct CollectionSnapshot {
    images: Vec<Image>,
    footprints: Option<Vec<Geometry>>,
}

impl CollectionSnapshot {
    /// Capture the ordered image list, resolving per-image footprints when
    /// the export path needs them (i.e. no global clip). Fails when an
    /// unclipped export would need a footprint an image does not carry.
    pub fn capture(collection: &ImageCollection, resolve_footprints: bool) -> LandResult<Self> {
        let images = collection.images().to_vec();
        let footprints = if resolve_footprints {
            let mut resolved = Vec::with_capacity(images.len());
            for image in &images {
                match image.footprint() {
                    Some(footprint) => resolved.push(footprint.clone()),
                    None => {
                        return Err(LandError::Metadata(format!(
                            "image {} carries no footprint geometry",
                            image.id()
                        )))
                    }
                }
            }
            Some(resolved)
        } else {
            None
        };
        Ok(CollectionSnapshot { images, footprints })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Footprint aligned with `images()[index]`, when footprints were
    /// resolved at capture time.
    pub fn footprint(&self, index: usize) -> Option<&Geometry> {
        self.footprints.as_ref().and_then(|list| list.get(index))
    }

    /// Union bounding box of the captured footprints, the asset export
    /// region.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.images
            .iter()
            .filter_map(|img| img.footprint().map(|g| g.bounding_box()))
            .reduce(|acc, bounds| acc.union(&bounds))
    }

    /// Replace every image through `f`, keeping order and footprint
    /// alignment. Used for the global ROI clip.
    pub fn map_images<F>(&mut self, mut f: F)
    where
        F: FnMut(&Image) -> Image,
    {
        self.images = self.images.iter().map(|img| f(img)).collect();
    }
}
