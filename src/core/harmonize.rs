//! Canonical band renaming.
//!
//! Selects the sensor's native bands for the requested canonical roles and
//! renames them, erasing sensor identity from the schema. After this stage
//! every stream exposes identical band names in the order the roles were
//! requested.

use crate::image::Image;
use crate::types::{LandResult, SpectralBand};

/// Rename the image's native bands to the requested canonical roles.
///
/// `roles` must already be filtered to recognized roles (config validation
/// guarantees this); request order is preserved in the output schema.
pub fn harmonize_bands(image: &Image, roles: &[SpectralBand]) -> LandResult<Image> {
    let profile = image.sensor().profile();
    let native = profile.native_bands(roles);
    let canonical: Vec<&str> = roles.iter().map(|role| role.name()).collect();
    image.select(&native, &canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageProperties;
    use crate::sensors::Sensor;

    fn scene(sensor: Sensor) -> Image {
        let native: Vec<String> = SpectralBand::ALL
            .iter()
            .map(|role| sensor.profile().native_band(*role).to_string())
            .chain(std::iter::once("QA_PIXEL".to_string()))
            .collect();
        Image::new("scene", sensor, native, ImageProperties::default())
    }

    #[test]
    fn all_sensors_converge_on_requested_schema() {
        let requested = [
            SpectralBand::Blue,
            SpectralBand::Green,
            SpectralBand::Red,
            SpectralBand::Nir,
        ];
        for sensor in Sensor::ALL {
            let harmonized = harmonize_bands(&scene(sensor), &requested).unwrap();
            assert_eq!(
                harmonized.band_names(),
                &["blue", "green", "red", "nir"],
                "schema mismatch for {}",
                sensor
            );
        }
    }

    #[test]
    fn request_order_is_preserved() {
        let requested = [SpectralBand::Swir2, SpectralBand::Blue];
        let harmonized = harmonize_bands(&scene(Sensor::Landsat7), &requested).unwrap();
        assert_eq!(harmonized.band_names(), &["swir2", "blue"]);
    }
}
