mod common;

use anyhow::Result;
use chrono::{NaiveDate, TimeZone, Utc};
use common::{scene_descriptor, MockArchiveService};
use landprep::sensors::Sensor;
use landprep::types::{Geometry, LandError};
use landprep::{preprocess, PreprocessConfig};

fn roi() -> Geometry {
    Geometry::polygon(vec![
        [115.168, 33.701],
        [115.216, 33.699],
        [115.214, 33.688],
        [115.169, 33.690],
    ])
}

fn footprint() -> Geometry {
    Geometry::rectangle(114.8, 33.2, 116.5, 34.5)
}

/// Catalog spanning both modern generations and one legacy sensor, with one
/// scene over the cloud ceiling.
fn populated_service() -> MockArchiveService {
    MockArchiveService::new()
        .with_scene(
            Sensor::Landsat5,
            scene_descriptor(
                Sensor::Landsat5,
                "LT05_122038_20120310",
                Utc.with_ymd_and_hms(2012, 3, 10, 2, 30, 0).unwrap(),
                22.0,
                footprint(),
            ),
        )
        .with_scene(
            Sensor::Landsat8,
            scene_descriptor(
                Sensor::Landsat8,
                "LC08_122038_20150712",
                Utc.with_ymd_and_hms(2015, 7, 12, 2, 40, 0).unwrap(),
                35.0,
                footprint(),
            ),
        )
        .with_scene(
            Sensor::Landsat8,
            scene_descriptor(
                Sensor::Landsat8,
                "LC08_122038_20150829",
                Utc.with_ymd_and_hms(2015, 8, 29, 2, 40, 0).unwrap(),
                81.0, // above the ceiling, must be filtered out
                footprint(),
            ),
        )
        .with_scene(
            Sensor::Landsat9,
            scene_descriptor(
                Sensor::Landsat9,
                "LC09_122038_20220504",
                Utc.with_ymd_and_hms(2022, 5, 4, 2, 40, 0).unwrap(),
                10.0,
                footprint(),
            ),
        )
}

fn base_config() -> PreprocessConfig {
    PreprocessConfig::new(
        NaiveDate::from_ymd_opt(2012, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        vec!["blue".into(), "green".into(), "red".into(), "nir".into()],
        roi(),
    )
}

#[test]
fn end_to_end_harmonizes_across_generations() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let service = populated_service();
    let mut config = base_config();
    config.cloud_cover_percent = 50.0;
    config.remove_cloud = true;
    config.cal_ndvi = true;

    let merged = preprocess(&service, &config)?;

    // One scene per archive passed the filters; the 81% cloudy one did not.
    assert_eq!(merged.size(), 3);

    for image in merged.images() {
        assert_eq!(
            image.band_names(),
            &["blue", "green", "red", "nir", "NDVI"],
            "schema mismatch for {}",
            image.id()
        );
        assert!(image.footprint().is_some(), "{} lost its footprint", image.id());
        assert!(image.acquisition_time().is_some());
    }

    let times: Vec<_> = merged
        .images()
        .iter()
        .map(|img| img.acquisition_time().unwrap())
        .collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));

    // No export flag was set, so nothing touched the filesystem or the
    // export endpoint.
    assert_eq!(service.download_count(), 0);
    assert!(service.exported_assets().is_empty());
    Ok(())
}

#[test]
fn merged_size_is_sum_of_filtered_archives() -> Result<()> {
    let service = populated_service();
    let mut config = base_config();
    config.cloud_cover_percent = 100.0;

    // With the ceiling relaxed all four scenes survive.
    let merged = preprocess(&service, &config)?;
    assert_eq!(merged.size(), 4);
    Ok(())
}

#[test]
fn date_filter_is_half_open() -> Result<()> {
    let service = populated_service();
    let mut config = base_config();
    // Window ends the day of the Landsat 9 acquisition; [start, end) must
    // exclude it.
    config.start_date = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    config.end_date = NaiveDate::from_ymd_opt(2022, 5, 4).unwrap();

    let merged = preprocess(&service, &config)?;
    let ids: Vec<_> = merged.images().iter().map(|img| img.id()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.iter().all(|id| id.contains("LC08")));
    Ok(())
}

#[test]
fn render_without_rgb_bands_fails_before_any_download() {
    let service = populated_service();
    let mut config = base_config();
    config.bands = vec!["nir".into()];
    config.render = true;
    config.save_local = true;
    config.local_dir = Some(std::env::temp_dir().join("landprep-never-written"));

    let err = preprocess(&service, &config).unwrap_err();
    assert!(matches!(err, LandError::Validation(_)), "got {:?}", err);
    assert_eq!(service.download_count(), 0);
}

#[test]
fn bad_band_list_fails_before_any_remote_call() {
    let service = populated_service();
    let mut config = base_config();
    config.bands = vec!["panchromatic".into()];

    let err = preprocess(&service, &config).unwrap_err();
    assert!(matches!(err, LandError::Config(_)));
}

#[test]
fn ndmi_flag_appends_moisture_band() -> Result<()> {
    let service = populated_service();
    let mut config = base_config();
    config.bands = vec!["nir".into(), "swir1".into()];
    config.cal_ndmi = true;

    let merged = preprocess(&service, &config)?;
    for image in merged.images() {
        assert_eq!(image.band_names(), &["nir", "swir1", "NDMI"]);
    }
    Ok(())
}
