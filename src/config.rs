//! Run configuration and pre-flight validation.
//!
//! [`PreprocessConfig`] is filled with the documented defaults at
//! construction and stays mutable until [`PreprocessConfig::validate`]
//! produces the immutable [`ValidatedConfig`] the pipeline runs on. No
//! remote call happens before validation passes.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

use crate::types::{Geometry, LandError, LandResult, SpectralBand, TimeRange};

/// Raw run configuration.
///
/// Required selection parameters go through [`PreprocessConfig::new`]; the
/// optional knobs are public fields pre-filled with their defaults.
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Earliest acquisition date to include (inclusive).
    pub start_date: NaiveDate,
    /// Latest acquisition date to include (exclusive).
    pub end_date: NaiveDate,
    /// Requested canonical bands; unrecognized names are filtered out.
    pub bands: Vec<String>,
    /// Region of interest for the spatial filter and the optional clip.
    pub roi: Geometry,
    /// Ceiling on the per-scene cloud-cover attribute, percent.
    pub cloud_cover_percent: f32,
    /// Mask cloud-contaminated pixels from QA_PIXEL bits.
    pub remove_cloud: bool,
    /// Append an NDVI band to every harmonized image.
    pub cal_ndvi: bool,
    /// Append an NDMI band to every harmonized image.
    pub cal_ndmi: bool,
    /// Clip every image to the ROI before export.
    pub clip_to_roi: bool,
    /// Projection for raw exports.
    pub export_crs: String,
    /// Resolution for raw exports, meters per pixel.
    pub export_scale: u32,
    /// Submit each image as an asynchronous asset export.
    pub save_asset: bool,
    /// Destination asset path, required when `save_asset` is set.
    pub asset_id: Option<String>,
    /// Download each image as a raw GeoTIFF.
    pub save_local: bool,
    /// Download directory; defaults to `~/.landprep/downloads` when unset.
    pub local_dir: Option<PathBuf>,
    /// Also export 8-bit RGB (and NDVI, when enabled) visualizations.
    pub render: bool,
    /// Resolution for rendered exports, meters per pixel.
    pub render_scale: u32,
}

impl PreprocessConfig {
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        bands: Vec<String>,
        roi: Geometry,
    ) -> PreprocessConfig {
        PreprocessConfig {
            start_date,
            end_date,
            bands,
            roi,
            cloud_cover_percent: 100.0,
            remove_cloud: false,
            cal_ndvi: false,
            cal_ndmi: false,
            clip_to_roi: false,
            export_crs: "EPSG:4326".to_string(),
            export_scale: 30,
            save_asset: false,
            asset_id: None,
            save_local: false,
            local_dir: None,
            render: false,
            render_scale: 100,
        }
    }

    /// Check every parameter and freeze the configuration.
    pub fn validate(&self) -> LandResult<ValidatedConfig> {
        let bands: Vec<SpectralBand> = self
            .bands
            .iter()
            .filter_map(|name| SpectralBand::parse(name))
            .collect();
        if bands.is_empty() {
            return Err(LandError::Config(format!(
                "BANDS contains no recognized spectral band (got {:?})",
                self.bands
            )));
        }

        if !(0.0..=100.0).contains(&self.cloud_cover_percent) {
            return Err(LandError::Config(format!(
                "CLOUD_COVER_PERCENT must lie in [0, 100], got {}",
                self.cloud_cover_percent
            )));
        }

        if self.start_date >= self.end_date {
            return Err(LandError::Config(format!(
                "empty date range: [{}, {})",
                self.start_date, self.end_date
            )));
        }

        let crs_pattern = Regex::new(r"^EPSG:\d+$")
            .map_err(|e| LandError::Config(format!("CRS pattern failed to compile: {}", e)))?;
        if !crs_pattern.is_match(&self.export_crs) {
            return Err(LandError::Config(format!(
                "EXPORT_CRS must look like EPSG:<code>, got {}",
                self.export_crs
            )));
        }

        if self.save_asset && self.asset_id.is_none() {
            return Err(LandError::Config(
                "SAVE_ASSET requires ASSET_ID".to_string(),
            ));
        }

        let local_dir = match &self.local_dir {
            Some(dir) => dir.clone(),
            None => default_download_dir()?,
        };

        let time_range = TimeRange {
            start: self
                .start_date
                .and_time(NaiveTime::MIN)
                .and_utc(),
            end: self.end_date.and_time(NaiveTime::MIN).and_utc(),
        };

        Ok(ValidatedConfig {
            time_range,
            bands,
            roi: self.roi.clone(),
            cloud_cover_percent: self.cloud_cover_percent,
            remove_cloud: self.remove_cloud,
            cal_ndvi: self.cal_ndvi,
            cal_ndmi: self.cal_ndmi,
            clip_to_roi: self.clip_to_roi,
            export_crs: self.export_crs.clone(),
            export_scale: self.export_scale,
            save_asset: self.save_asset,
            asset_id: self.asset_id.clone(),
            save_local: self.save_local,
            local_dir,
            render: self.render,
            render_scale: self.render_scale,
        })
    }
}

fn default_download_dir() -> LandResult<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LandError::Config("cannot resolve a home directory for LOCAL_DIR".into()))?;
    Ok(home.join(".landprep").join("downloads"))
}

/// Immutable, fully-defaulted configuration the pipeline runs on.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub time_range: TimeRange,
    /// Recognized canonical bands in the order they were requested. Defines
    /// the output schema.
    pub bands: Vec<SpectralBand>,
    pub roi: Geometry,
    pub cloud_cover_percent: f32,
    pub remove_cloud: bool,
    pub cal_ndvi: bool,
    pub cal_ndmi: bool,
    pub clip_to_roi: bool,
    pub export_crs: String,
    pub export_scale: u32,
    pub save_asset: bool,
    pub asset_id: Option<String>,
    pub save_local: bool,
    pub local_dir: PathBuf,
    pub render: bool,
    pub render_scale: u32,
}

impl ValidatedConfig {
    /// Requested canonical band names, harmonization order.
    pub fn band_names(&self) -> Vec<&'static str> {
        self.bands.iter().map(|band| band.name()).collect()
    }

    pub fn wants_band(&self, band: SpectralBand) -> bool {
        self.bands.contains(&band)
    }

    /// Whether any export branch will run.
    pub fn exports_anything(&self) -> bool {
        self.save_asset || self.save_local || self.render
    }
}
