//! Derived vegetation and moisture index bands.
//!
//! Both indices are normalized differences over harmonized bands, appended
//! after renaming so the formulas are sensor-independent. Requests for an
//! index without its input bands fail with a band-not-found error.

use crate::image::Image;
use crate::types::LandResult;

/// Band name of the derived vegetation index.
pub const NDVI_BAND: &str = "NDVI";

/// Band name of the derived moisture index.
pub const NDMI_BAND: &str = "NDMI";

/// 17-stop white-to-dark-green ramp used for NDVI renders.
pub const NDVI_PALETTE: [&str; 17] = [
    "FFFFFF", "CE7E45", "DF923D", "F1B555", "FCD163", "99B718", "74A901", "66A000", "529400",
    "3E8601", "207401", "056201", "004C00", "023B01", "012E01", "011D01", "011301",
];

/// Append `NDVI = (nir - red) / (nir + red)`.
pub fn ndvi(image: &Image) -> LandResult<Image> {
    image.normalized_difference("nir", "red", NDVI_BAND)
}

/// Append `NDMI = (nir - swir1) / (nir + swir1)`.
pub fn ndmi(image: &Image) -> LandResult<Image> {
    image.normalized_difference("nir", "swir1", NDMI_BAND)
}
