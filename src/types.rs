use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sensor-independent spectral role used after harmonization.
///
/// All five Landsat generations are renamed onto these roles, so downstream
/// consumers never see native `SR_B*` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectralBand {
    Blue,
    Green,
    Red,
    Nir,
    Swir1,
    Swir2,
}

impl SpectralBand {
    /// Every recognized canonical role, in reference order.
    pub const ALL: [SpectralBand; 6] = [
        SpectralBand::Blue,
        SpectralBand::Green,
        SpectralBand::Red,
        SpectralBand::Nir,
        SpectralBand::Swir1,
        SpectralBand::Swir2,
    ];

    /// Canonical band name as it appears in harmonized schemas.
    pub fn name(&self) -> &'static str {
        match self {
            SpectralBand::Blue => "blue",
            SpectralBand::Green => "green",
            SpectralBand::Red => "red",
            SpectralBand::Nir => "nir",
            SpectralBand::Swir1 => "swir1",
            SpectralBand::Swir2 => "swir2",
        }
    }

    /// Parse a user-supplied band name. Unrecognized names yield `None` and
    /// are filtered out by config validation.
    pub fn parse(name: &str) -> Option<SpectralBand> {
        match name {
            "blue" => Some(SpectralBand::Blue),
            "green" => Some(SpectralBand::Green),
            "red" => Some(SpectralBand::Red),
            "nir" => Some(SpectralBand::Nir),
            "swir1" => Some(SpectralBand::Swir1),
            "swir2" => Some(SpectralBand::Swir2),
            _ => None,
        }
    }
}

impl std::fmt::Display for SpectralBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Geospatial bounding box in lon/lat degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Smallest box covering both inputs.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_lon: self.min_lon.min(other.min_lon),
            max_lon: self.max_lon.max(other.max_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
            && self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
    }
}

/// Region geometry in lon/lat degrees.
///
/// Only the shapes the archive service accepts as region parameters. Spatial
/// filtering itself is delegated to the service; locally we only need
/// bounding-box reasoning for export regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    /// Exterior ring of `[lon, lat]` vertices.
    Polygon { coordinates: Vec<[f64; 2]> },
    Rectangle { bounds: BoundingBox },
}

impl Geometry {
    pub fn rectangle(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Geometry {
        Geometry::Rectangle {
            bounds: BoundingBox {
                min_lon,
                max_lon,
                min_lat,
                max_lat,
            },
        }
    }

    pub fn polygon(coordinates: Vec<[f64; 2]>) -> Geometry {
        Geometry::Polygon { coordinates }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Geometry::Rectangle { bounds } => *bounds,
            Geometry::Polygon { coordinates } => {
                let mut bounds = BoundingBox {
                    min_lon: f64::INFINITY,
                    max_lon: f64::NEG_INFINITY,
                    min_lat: f64::INFINITY,
                    max_lat: f64::NEG_INFINITY,
                };
                for [lon, lat] in coordinates {
                    bounds.min_lon = bounds.min_lon.min(*lon);
                    bounds.max_lon = bounds.max_lon.max(*lon);
                    bounds.min_lat = bounds.min_lat.min(*lat);
                    bounds.max_lat = bounds.max_lat.max(*lat);
                }
                bounds
            }
        }
    }
}

/// Half-open acquisition interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Error types for Landsat preprocessing.
#[derive(Debug, thiserror::Error)]
pub enum LandError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("band not found: {0}")]
    BandNotFound(String),

    #[error("metadata error: {0}")]
    Metadata(String),

    #[error("archive service error: {0}")]
    Service(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for preprocessing operations.
pub type LandResult<T> = Result<T, LandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_names_round_trip() {
        for band in SpectralBand::ALL {
            assert_eq!(SpectralBand::parse(band.name()), Some(band));
        }
        assert_eq!(SpectralBand::parse("thermal"), None);
    }

    #[test]
    fn polygon_bounding_box() {
        let geom = Geometry::polygon(vec![[10.0, 50.0], [12.0, 51.0], [11.0, 49.5]]);
        let bounds = geom.bounding_box();
        assert_eq!(bounds.min_lon, 10.0);
        assert_eq!(bounds.max_lon, 12.0);
        assert_eq!(bounds.min_lat, 49.5);
        assert_eq!(bounds.max_lat, 51.0);
    }

    #[test]
    fn bounding_box_union() {
        let a = BoundingBox {
            min_lon: 0.0,
            max_lon: 2.0,
            min_lat: 0.0,
            max_lat: 2.0,
        };
        let b = BoundingBox {
            min_lon: 1.0,
            max_lon: 4.0,
            min_lat: -1.0,
            max_lat: 1.0,
        };
        let u = a.union(&b);
        assert_eq!(u.min_lon, 0.0);
        assert_eq!(u.max_lon, 4.0);
        assert_eq!(u.min_lat, -1.0);
        assert_eq!(u.max_lat, 2.0);
    }
}
