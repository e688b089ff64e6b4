//! In-memory archive service for integration tests.

// Each integration test binary compiles this module separately and not all
// of them touch every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use landprep::io::{
    ArchiveService, AssetExportRequest, DownloadRequest, ExportTaskId, ImageDescriptor,
    SearchQuery,
};
use landprep::sensors::{Sensor, QA_BAND};
use landprep::types::{Geometry, LandResult, SpectralBand};

/// One recorded download, enough to assert on destinations and regions.
#[derive(Debug, Clone)]
pub struct RecordedDownload {
    pub image_id: String,
    pub destination: PathBuf,
    pub region: Geometry,
    pub scale: u32,
}

/// Archive fake: canned catalogs per archive id, recording every
/// materializing call. Downloads write a small placeholder raster so file
/// assertions work.
#[derive(Default)]
pub struct MockArchiveService {
    catalogs: HashMap<String, Vec<ImageDescriptor>>,
    pub downloads: Mutex<Vec<RecordedDownload>>,
    pub asset_exports: Mutex<Vec<String>>,
}

impl MockArchiveService {
    pub fn new() -> MockArchiveService {
        MockArchiveService::default()
    }

    pub fn with_scene(mut self, sensor: Sensor, descriptor: ImageDescriptor) -> Self {
        self.catalogs
            .entry(sensor.profile().archive.to_string())
            .or_default()
            .push(descriptor);
        self
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().unwrap().len()
    }

    pub fn exported_assets(&self) -> Vec<String> {
        self.asset_exports.lock().unwrap().clone()
    }
}

impl ArchiveService for MockArchiveService {
    fn search(&self, archive: &str, query: &SearchQuery) -> LandResult<Vec<ImageDescriptor>> {
        let catalog = self.catalogs.get(archive).cloned().unwrap_or_default();
        Ok(catalog
            .into_iter()
            .filter(|scene| query.time_range.contains(scene.time_start))
            .filter(|scene| {
                scene
                    .footprint
                    .bounding_box()
                    .intersects(&query.region.bounding_box())
            })
            .filter(|scene| scene.cloud_cover <= query.max_cloud_cover)
            .collect())
    }

    fn download(&self, request: &DownloadRequest<'_>) -> LandResult<()> {
        if let Some(parent) = request.destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(request.destination, b"placeholder geotiff")?;
        self.downloads.lock().unwrap().push(RecordedDownload {
            image_id: request.image.id().to_string(),
            destination: request.destination.to_path_buf(),
            region: request.region.clone(),
            scale: request.scale,
        });
        Ok(())
    }

    fn export_to_asset(&self, request: &AssetExportRequest<'_>) -> LandResult<ExportTaskId> {
        let mut exports = self.asset_exports.lock().unwrap();
        exports.push(request.asset_id.clone());
        Ok(ExportTaskId(format!("task-{}", exports.len())))
    }
}

/// A catalog entry with the sensor's full native band complement.
pub fn scene_descriptor(
    sensor: Sensor,
    scene_id: &str,
    time_start: DateTime<Utc>,
    cloud_cover: f32,
    footprint: Geometry,
) -> ImageDescriptor {
    let profile = sensor.profile();
    let mut bands: Vec<String> = SpectralBand::ALL
        .iter()
        .map(|role| profile.native_band(*role).to_string())
        .collect();
    if sensor.is_modern() {
        bands.push("ST_B10".to_string());
    } else {
        bands.push("ST_B6".to_string());
    }
    bands.push(QA_BAND.to_string());

    ImageDescriptor {
        id: format!("{}/{}", profile.archive, scene_id),
        time_start,
        time_end: Some(time_start + chrono::Duration::minutes(1)),
        footprint,
        cloud_cover,
        bands,
        properties: HashMap::new(),
    }
}
