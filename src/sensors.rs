//! Static registry of the five Landsat sensor generations.
//!
//! Per-sensor divergence (native band codes, QA bit layout, thermal band
//! coverage) lives in this one table; the processing stages in `core` are
//! generic over a [`SensorProfile`] lookup instead of carrying per-sensor
//! variants.

use serde::{Deserialize, Serialize};

use crate::types::SpectralBand;

/// Name of the per-pixel quality-assurance band in Collection-2 archives.
pub const QA_BAND: &str = "QA_PIXEL";

/// Landsat sensor generations covered by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sensor {
    Landsat9,
    Landsat8,
    Landsat7,
    Landsat5,
    Landsat4,
}

impl Sensor {
    /// All supported sensors, newest generation first. This order doubles as
    /// the merge tie-break priority for images sharing an acquisition time.
    pub const ALL: [Sensor; 5] = [
        Sensor::Landsat9,
        Sensor::Landsat8,
        Sensor::Landsat7,
        Sensor::Landsat5,
        Sensor::Landsat4,
    ];

    /// Landsat 8/9 carry the OLI instrument with a cirrus QA bit and the
    /// modern band numbering; 4/5/7 are the legacy TM/ETM+ layout.
    pub fn is_modern(self) -> bool {
        matches!(self, Sensor::Landsat9 | Sensor::Landsat8)
    }

    /// Tie-break rank for the merged sort, 0 = newest generation.
    pub fn priority(self) -> u8 {
        match self {
            Sensor::Landsat9 => 0,
            Sensor::Landsat8 => 1,
            Sensor::Landsat7 => 2,
            Sensor::Landsat5 => 3,
            Sensor::Landsat4 => 4,
        }
    }

    pub fn profile(self) -> &'static SensorProfile {
        match self {
            Sensor::Landsat9 => &LANDSAT9,
            Sensor::Landsat8 => &LANDSAT8,
            Sensor::Landsat7 => &LANDSAT7,
            Sensor::Landsat5 => &LANDSAT5,
            Sensor::Landsat4 => &LANDSAT4,
        }
    }
}

impl std::fmt::Display for Sensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sensor::Landsat9 => write!(f, "Landsat 9"),
            Sensor::Landsat8 => write!(f, "Landsat 8"),
            Sensor::Landsat7 => write!(f, "Landsat 7"),
            Sensor::Landsat5 => write!(f, "Landsat 5"),
            Sensor::Landsat4 => write!(f, "Landsat 4"),
        }
    }
}

/// QA_PIXEL bit positions tested by the cloud mask.
///
/// Legacy TM/ETM+ products carry no cirrus flag, so `cirrus` is `None` there
/// and the mask tests one bit fewer.
#[derive(Debug, Clone, Copy)]
pub struct QaBitLayout {
    pub dilated_cloud: u8,
    pub cirrus: Option<u8>,
    pub cloud: u8,
    pub cloud_shadow: u8,
}

impl QaBitLayout {
    /// Bits that must all read zero for a pixel to stay valid.
    pub fn tested_bits(&self) -> Vec<u8> {
        let mut bits = vec![self.cloud, self.cloud_shadow, self.dilated_cloud];
        if let Some(cirrus) = self.cirrus {
            bits.push(cirrus);
        }
        bits
    }
}

/// Linear radiometric correction `value * scale + offset` for one band group,
/// addressed by the archive's native band pattern.
#[derive(Debug, Clone, Copy)]
pub struct ScaleOffset {
    pub pattern: &'static str,
    pub scale: f64,
    pub offset: f64,
}

impl ScaleOffset {
    /// Corrected value for a raw digital number. The remote service applies
    /// the same expression per pixel; this local form exists for parameter
    /// checks and tests.
    pub fn apply(&self, dn: f64) -> f64 {
        dn * self.scale + self.offset
    }
}

/// Everything the pipeline needs to know about one sensor generation.
#[derive(Debug, Clone)]
pub struct SensorProfile {
    pub sensor: Sensor,
    /// Collection-2 Level-2 archive identifier.
    pub archive: &'static str,
    /// {canonical role -> native surface reflectance band code}.
    band_map: &'static [(SpectralBand, &'static str); 6],
    pub qa_bits: QaBitLayout,
    pub optical: ScaleOffset,
    pub thermal: ScaleOffset,
}

impl SensorProfile {
    /// Native band code for a canonical role.
    pub fn native_band(&self, role: SpectralBand) -> &'static str {
        // Six-entry table, linear scan is fine.
        self.band_map
            .iter()
            .find(|(band, _)| *band == role)
            .map(|(_, code)| *code)
            .unwrap_or_else(|| unreachable!("band map covers every canonical role"))
    }

    /// Native band codes for a list of canonical roles, order preserved.
    pub fn native_bands(&self, roles: &[SpectralBand]) -> Vec<&'static str> {
        roles.iter().map(|role| self.native_band(*role)).collect()
    }
}

/// OLI band numbering shared by Landsat 8 and 9.
static MODERN_BANDS: [(SpectralBand, &str); 6] = [
    (SpectralBand::Blue, "SR_B2"),
    (SpectralBand::Green, "SR_B3"),
    (SpectralBand::Red, "SR_B4"),
    (SpectralBand::Nir, "SR_B5"),
    (SpectralBand::Swir1, "SR_B6"),
    (SpectralBand::Swir2, "SR_B7"),
];

/// TM/ETM+ band numbering shared by Landsat 4, 5 and 7.
static LEGACY_BANDS: [(SpectralBand, &str); 6] = [
    (SpectralBand::Blue, "SR_B1"),
    (SpectralBand::Green, "SR_B2"),
    (SpectralBand::Red, "SR_B3"),
    (SpectralBand::Nir, "SR_B4"),
    (SpectralBand::Swir1, "SR_B5"),
    (SpectralBand::Swir2, "SR_B7"),
];

const MODERN_QA: QaBitLayout = QaBitLayout {
    dilated_cloud: 1,
    cirrus: Some(2),
    cloud: 3,
    cloud_shadow: 4,
};

const LEGACY_QA: QaBitLayout = QaBitLayout {
    dilated_cloud: 1,
    cirrus: None,
    cloud: 3,
    cloud_shadow: 4,
};

// Collection-2 Level-2 correction coefficients, identical across sensors.
const OPTICAL_SCALE: f64 = 2.75e-5;
const OPTICAL_OFFSET: f64 = -0.2;
const THERMAL_SCALE: f64 = 3.41802e-3;
const THERMAL_OFFSET: f64 = 149.0;

const fn optical() -> ScaleOffset {
    ScaleOffset {
        pattern: "SR_B.",
        scale: OPTICAL_SCALE,
        offset: OPTICAL_OFFSET,
    }
}

const fn thermal(pattern: &'static str) -> ScaleOffset {
    ScaleOffset {
        pattern,
        scale: THERMAL_SCALE,
        offset: THERMAL_OFFSET,
    }
}

static LANDSAT9: SensorProfile = SensorProfile {
    sensor: Sensor::Landsat9,
    archive: "LANDSAT/LC09/C02/T1_L2",
    band_map: &MODERN_BANDS,
    qa_bits: MODERN_QA,
    optical: optical(),
    thermal: thermal("ST_B.*"),
};

static LANDSAT8: SensorProfile = SensorProfile {
    sensor: Sensor::Landsat8,
    archive: "LANDSAT/LC08/C02/T1_L2",
    band_map: &MODERN_BANDS,
    qa_bits: MODERN_QA,
    optical: optical(),
    thermal: thermal("ST_B.*"),
};

static LANDSAT7: SensorProfile = SensorProfile {
    sensor: Sensor::Landsat7,
    archive: "LANDSAT/LE07/C02/T1_L2",
    band_map: &LEGACY_BANDS,
    qa_bits: LEGACY_QA,
    optical: optical(),
    thermal: thermal("ST_B6"),
};

static LANDSAT5: SensorProfile = SensorProfile {
    sensor: Sensor::Landsat5,
    archive: "LANDSAT/LT05/C02/T1_L2",
    band_map: &LEGACY_BANDS,
    qa_bits: LEGACY_QA,
    optical: optical(),
    thermal: thermal("ST_B6"),
};

static LANDSAT4: SensorProfile = SensorProfile {
    sensor: Sensor::Landsat4,
    archive: "LANDSAT/LT04/C02/T1_L2",
    band_map: &LEGACY_BANDS,
    qa_bits: LEGACY_QA,
    optical: optical(),
    thermal: thermal("ST_B6"),
};
