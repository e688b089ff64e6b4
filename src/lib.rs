//! landprep: A Fast, Modular Landsat Collection-2 Preprocessor
//!
//! This library turns the five Landsat sensor generations (4/5/7/8/9) into one
//! analysis-ready, chronologically ordered image collection: per-sensor cloud
//! masking from QA_PIXEL bits, radiometric scaling, harmonization onto
//! canonical band names, optional NDVI/NDMI derivation, and export routing to
//! remote assets, raw GeoTIFFs or rendered visualizations.
//!
//! All per-pixel math executes on an injected archive/compute service; the
//! pipeline composes declarative operation chains and materializes them only
//! at download or export time.

pub mod config;
pub mod core;
pub mod image;
pub mod io;
pub mod pipeline;
pub mod sensors;
pub mod types;

// Re-export main types and functions for easier access
pub use config::{PreprocessConfig, ValidatedConfig};
pub use image::{Image, ImageCollection, ImageOp, ImageProperties, VisParams};
pub use io::{
    ArchiveService, ExportDispatcher, ExportSummary, HttpArchiveService, HttpServiceConfig,
};
pub use pipeline::preprocess;
pub use sensors::{Sensor, SensorProfile};
pub use types::{
    BoundingBox, Geometry, LandError, LandResult, SpectralBand, TimeRange,
};
