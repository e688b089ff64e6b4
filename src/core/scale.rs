//! Per-sensor radiometric correction.
//!
//! Collection-2 Level-2 digital numbers become surface reflectance
//! (optical) and Kelvin (thermal) through `value * scale + offset`, with the
//! coefficients and native band patterns taken from the sensor profile.
//! This stage runs unconditionally, with or without cloud masking.

use crate::image::Image;

/// Apply the optical and thermal scale factors of the image's sensor.
///
/// Band replacement rebuilds the image on the remote side and drops its
/// system properties; they are explicitly re-attached here.
pub fn apply_scale_factors(image: &Image) -> Image {
    let profile = image.sensor().profile();
    image
        .scale_bands(
            profile.optical.pattern,
            profile.optical.scale,
            profile.optical.offset,
        )
        .scale_bands(
            profile.thermal.pattern,
            profile.thermal.scale,
            profile.thermal.offset,
        )
        .preserving_properties(image)
}
