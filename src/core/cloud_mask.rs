//! Pixel-validity masking from QA_PIXEL bits.
//!
//! A pixel survives only when the cloud, cloud-shadow and dilated-cloud bits
//! all read zero; modern sensors additionally test the cirrus bit. Which
//! bits apply comes from the sensor profile, so one routine serves all five
//! generations.

use crate::image::Image;
use crate::sensors::QA_BAND;

/// Mask cloud-contaminated pixels of one image.
///
/// The masked handle is rebuilt by the remote engine and would lose its
/// system properties; they are explicitly re-attached here.
pub fn mask_clouds(image: &Image) -> Image {
    let bits = image.sensor().profile().qa_bits.tested_bits();
    image
        .update_mask_from_qa(QA_BAND, bits)
        .preserving_properties(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ImageOp, ImageProperties};
    use crate::sensors::Sensor;
    use crate::types::Geometry;
    use chrono::{TimeZone, Utc};

    fn scene(sensor: Sensor) -> Image {
        Image::new(
            "LANDSAT/LC09/C02/T1_L2/LC09_122038_20230109",
            sensor,
            vec!["SR_B2".into(), "QA_PIXEL".into()],
            ImageProperties {
                time_start: Some(Utc.with_ymd_and_hms(2023, 1, 9, 2, 40, 0).unwrap()),
                time_end: Some(Utc.with_ymd_and_hms(2023, 1, 9, 2, 41, 0).unwrap()),
                footprint: Some(Geometry::rectangle(115.0, 33.0, 117.0, 35.0)),
                cloud_cover: Some(8.0),
                extra: Default::default(),
            },
        )
    }

    #[test]
    fn modern_sensor_tests_cirrus_bit() {
        let masked = mask_clouds(&scene(Sensor::Landsat9));
        match masked.ops().last() {
            Some(ImageOp::QaBitMask { band, bits }) => {
                assert_eq!(band, "QA_PIXEL");
                assert_eq!(bits, &vec![3, 4, 1, 2]);
            }
            other => panic!("expected QA bit mask op, got {:?}", other),
        }
    }

    #[test]
    fn legacy_sensor_skips_cirrus_bit() {
        let masked = mask_clouds(&scene(Sensor::Landsat7));
        match masked.ops().last() {
            Some(ImageOp::QaBitMask { bits, .. }) => assert_eq!(bits, &vec![3, 4, 1]),
            other => panic!("expected QA bit mask op, got {:?}", other),
        }
    }

    #[test]
    fn masking_preserves_time_and_footprint() {
        let input = scene(Sensor::Landsat8);
        let masked = mask_clouds(&input);
        assert_eq!(masked.acquisition_time(), input.acquisition_time());
        assert_eq!(masked.properties().time_end, input.properties().time_end);
        assert_eq!(masked.footprint(), input.footprint());
    }
}
