//! Per-image export routing.
//!
//! Walks the cached ordered snapshot exactly once and, per image, fires the
//! independently-enabled branches: asynchronous asset export, raw GeoTIFF
//! download, rendered RGB and NDVI visualizations. The loop is strictly
//! sequential; asset submissions are asynchronous on the remote side and are
//! never polled. A failure partway through leaves the completed prefix on
//! disk with no resumption record.

use std::path::PathBuf;

use crate::config::ValidatedConfig;
use crate::core::indices::{NDVI_BAND, NDVI_PALETTE};
use crate::core::merge::CollectionSnapshot;
use crate::image::{Image, VisParams};
use crate::io::service::{ArchiveService, AssetExportRequest, DownloadRequest};
use crate::types::{Geometry, LandError, LandResult, SpectralBand};

/// Pixel budget submitted with asset export jobs, effectively unbounded.
const ASSET_MAX_PIXELS: u64 = 10_000_000_000_000;

/// Reflectance range mapped onto 8 bits for RGB renders.
const RGB_RENDER_RANGE: (f64, f64) = (0.0, 0.3);

/// Index range mapped through the palette for NDVI renders.
const NDVI_RENDER_RANGE: (f64, f64) = (0.0, 1.0);

/// Counts of what one dispatch run submitted and wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub assets_submitted: usize,
    pub rasters_downloaded: usize,
    pub renders_downloaded: usize,
}

/// Routes each image of the merged snapshot to its configured destinations.
pub struct ExportDispatcher<'a, S: ArchiveService + ?Sized> {
    service: &'a S,
    config: &'a ValidatedConfig,
}

impl<'a, S: ArchiveService + ?Sized> ExportDispatcher<'a, S> {
    pub fn new(service: &'a S, config: &'a ValidatedConfig) -> ExportDispatcher<'a, S> {
        ExportDispatcher { service, config }
    }

    /// Run every enabled export branch over the snapshot.
    ///
    /// Render exports require {red, green, blue} among the requested bands;
    /// that is checked up front so a bad render request fails before any
    /// download is attempted.
    pub fn dispatch(&self, snapshot: &CollectionSnapshot) -> LandResult<ExportSummary> {
        let mut summary = ExportSummary::default();
        let config = self.config;

        if config.render {
            let missing: Vec<&str> = [SpectralBand::Red, SpectralBand::Green, SpectralBand::Blue]
                .iter()
                .filter(|band| !config.wants_band(**band))
                .map(|band| band.name())
                .collect();
            if !missing.is_empty() {
                return Err(LandError::Validation(format!(
                    "RENDER requires red, green and blue in BANDS, missing {:?}",
                    missing
                )));
            }
        }

        if !config.exports_anything() || snapshot.is_empty() {
            return Ok(summary);
        }

        if config.save_local || config.render {
            std::fs::create_dir_all(&config.local_dir)?;
        }

        // Asset jobs target the merged collection bounds rather than the
        // per-image footprint.
        let collection_region = snapshot.bounds().map(|b| Geometry::Rectangle { bounds: b });

        for (index, image) in snapshot.images().iter().enumerate() {
            let name = scene_name(image.id());
            log::debug!("Dispatching exports for {}", name);

            if config.save_asset {
                self.export_asset(image, name, collection_region.as_ref())?;
                summary.assets_submitted += 1;
            }

            if config.save_local {
                self.download_raw(image, name, snapshot.footprint(index))?;
                summary.rasters_downloaded += 1;
            }

            if config.render {
                self.render_rgb(image, name, snapshot.footprint(index))?;
                summary.renders_downloaded += 1;
                if config.cal_ndvi {
                    self.render_ndvi(image, name, snapshot.footprint(index))?;
                    summary.renders_downloaded += 1;
                }
            }
        }

        log::info!(
            "Export dispatch done: {} asset jobs, {} rasters, {} renders",
            summary.assets_submitted,
            summary.rasters_downloaded,
            summary.renders_downloaded
        );
        Ok(summary)
    }

    fn export_asset(
        &self,
        image: &Image,
        name: &str,
        collection_region: Option<&Geometry>,
    ) -> LandResult<()> {
        let config = self.config;
        let asset_root = config.asset_id.as_deref().ok_or_else(|| {
            LandError::Validation("asset export enabled without ASSET_ID".to_string())
        })?;
        let region = collection_region.cloned().ok_or_else(|| {
            LandError::Metadata("asset export needs collection bounds".to_string())
        })?;

        let asset_id = format!("{}/{}", asset_root, name);
        log::info!("Exporting {} to {}", name, asset_id);
        let task = self.service.export_to_asset(&AssetExportRequest {
            image,
            asset_id,
            description: name.to_string(),
            region,
            scale: config.export_scale,
            max_pixels: ASSET_MAX_PIXELS,
        })?;
        // Fire-and-forget: the job keeps running remotely, nothing polls it.
        log::debug!("Asset task {} submitted for {}", task, name);
        Ok(())
    }

    /// Region for a local export: ROI under a global clip, the image's own
    /// footprint otherwise.
    fn local_region(&self, footprint: Option<&Geometry>) -> LandResult<Geometry> {
        if self.config.clip_to_roi {
            Ok(self.config.roi.clone())
        } else {
            footprint.cloned().ok_or_else(|| {
                LandError::Metadata("unclipped export needs a resolved footprint".to_string())
            })
        }
    }

    fn download_raw(
        &self,
        image: &Image,
        name: &str,
        footprint: Option<&Geometry>,
    ) -> LandResult<()> {
        let config = self.config;
        let destination = self.local_path(name, ".tif");
        log::info!("Downloading raw image {} to {}", name, destination.display());
        self.service.download(&DownloadRequest {
            image,
            region: self.local_region(footprint)?,
            crs: config.export_crs.clone(),
            scale: config.export_scale,
            destination: &destination,
        })
    }

    fn render_rgb(
        &self,
        image: &Image,
        name: &str,
        footprint: Option<&Geometry>,
    ) -> LandResult<()> {
        let config = self.config;
        let rgb = ["red", "green", "blue"];
        let rendered = image.select(&rgb, &rgb)?.visualize(VisParams {
            bands: rgb.iter().map(|b| b.to_string()).collect(),
            min: RGB_RENDER_RANGE.0,
            max: RGB_RENDER_RANGE.1,
            palette: None,
        })?;

        let destination = self.local_path(name, "_render_RGB.tif");
        log::info!("Downloading RGB render of {} to {}", name, destination.display());
        self.service.download(&DownloadRequest {
            image: &rendered,
            region: self.local_region(footprint)?,
            crs: config.export_crs.clone(),
            scale: config.render_scale,
            destination: &destination,
        })
    }

    fn render_ndvi(
        &self,
        image: &Image,
        name: &str,
        footprint: Option<&Geometry>,
    ) -> LandResult<()> {
        let config = self.config;
        let rendered = image
            .select(&[NDVI_BAND], &[NDVI_BAND])?
            .visualize(VisParams {
                bands: vec![NDVI_BAND.to_string()],
                min: NDVI_RENDER_RANGE.0,
                max: NDVI_RENDER_RANGE.1,
                palette: Some(NDVI_PALETTE.iter().map(|c| c.to_string()).collect()),
            })?;

        let destination = self.local_path(name, "_render_NDVI.tif");
        log::info!(
            "Downloading NDVI render of {} to {}",
            name,
            destination.display()
        );
        self.service.download(&DownloadRequest {
            image: &rendered,
            region: self.local_region(footprint)?,
            crs: config.export_crs.clone(),
            scale: config.render_scale,
            destination: &destination,
        })
    }

    fn local_path(&self, name: &str, suffix: &str) -> PathBuf {
        self.config.local_dir.join(format!("{}{}", name, suffix))
    }
}

/// Output name for one image: the scene id, i.e. the last segment of the
/// archive path (`LANDSAT/LC08/.../LC08_122038_20230105` ->
/// `LC08_122038_20230105`).
pub fn scene_name(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_name_strips_archive_path() {
        assert_eq!(
            scene_name("LANDSAT/LC08/C02/T1_L2/LC08_122038_20230105"),
            "LC08_122038_20230105"
        );
        assert_eq!(scene_name("LC08_122038_20230105"), "LC08_122038_20230105");
    }
}
