//! The preprocessing pipeline.
//!
//! Validate -> select (one query per sensor archive) -> optional cloud mask
//! -> radiometric scaling -> band harmonization -> optional indices -> merge
//! -> snapshot -> optional clip -> export dispatch. Per-image transforms are
//! deferred op compositions; only search, download and export submission
//! touch the service.

use std::time::Instant;

use crate::config::{PreprocessConfig, ValidatedConfig};
use crate::core::{
    cloud_mask, harmonize, indices, merge::CollectionSnapshot, merge_collections,
    scale,
};
use crate::image::{Image, ImageCollection};
use crate::io::export::ExportDispatcher;
use crate::io::service::{ArchiveService, SearchQuery};
use crate::sensors::Sensor;
use crate::types::LandResult;

/// Produce the analysis-ready merged collection and run the configured
/// exports.
///
/// Returns the merged, chronologically ordered collection (clipped to the
/// ROI when configured). Remote failures propagate uncaught and abort the
/// run.
pub fn preprocess<S>(service: &S, config: &PreprocessConfig) -> LandResult<ImageCollection>
where
    S: ArchiveService + ?Sized,
{
    let started = Instant::now();
    let config = config.validate()?;

    let parts = select_and_process(service, &config)?;
    let mut merged = merge_collections(parts);
    log::info!("Total images after merge: {}", merged.size());

    // One snapshot feeds both footprint resolution and the export loop, so
    // their indices cannot drift between two materializations.
    let need_footprints =
        (config.save_local || config.render) && !config.clip_to_roi;
    let mut snapshot = CollectionSnapshot::capture(&merged, need_footprints)?;

    if config.clip_to_roi {
        let roi = config.roi.clone();
        merged = merged.map(|img| img.clip(roi.clone()));
        snapshot.map_images(|img| img.clip(roi.clone()));
    }

    if config.exports_anything() {
        ExportDispatcher::new(service, &config).dispatch(&snapshot)?;
    }

    log::info!("Preprocessing finished in {:.1?}", started.elapsed());
    Ok(merged)
}

/// Query each sensor archive and run the per-sensor stages over the result.
fn select_and_process<S>(
    service: &S,
    config: &ValidatedConfig,
) -> LandResult<Vec<ImageCollection>>
where
    S: ArchiveService + ?Sized,
{
    let query = SearchQuery {
        time_range: config.time_range,
        region: config.roi.clone(),
        max_cloud_cover: config.cloud_cover_percent,
    };

    let mut parts = Vec::with_capacity(Sensor::ALL.len());
    for sensor in Sensor::ALL {
        let profile = sensor.profile();
        let descriptors = service.search(profile.archive, &query)?;
        log::info!("{}: {} scenes selected", sensor, descriptors.len());

        let mut collection = ImageCollection::new(
            descriptors
                .into_iter()
                .map(|descriptor| Image::from_descriptor(sensor, descriptor))
                .collect(),
        );

        if config.remove_cloud {
            collection = collection.map(cloud_mask::mask_clouds);
        }
        collection = collection.map(scale::apply_scale_factors);
        collection =
            collection.try_map(|img| harmonize::harmonize_bands(img, &config.bands))?;
        if config.cal_ndvi {
            collection = collection.try_map(indices::ndvi)?;
        }
        if config.cal_ndmi {
            collection = collection.try_map(indices::ndmi)?;
        }

        parts.push(collection);
    }
    Ok(parts)
}
