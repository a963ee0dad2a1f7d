//! Geometry type definitions

use std::fmt;

/// Mean Earth radius used by the small-angle approximation.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A geographic point read from the input table.
///
/// Stored as (longitude, latitude) to match the column order of the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Longitude in decimal degrees
    pub lon: f64,
    /// Latitude in decimal degrees
    pub lat: f64,
}

impl Coordinate {
    /// Creates a coordinate from longitude and latitude.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Canonical decimal text of the latitude.
    ///
    /// Uses the shortest representation that parses back to the same `f64`,
    /// so a value written into a filename is recovered bit-for-bit.
    pub fn lat_text(&self) -> String {
        canonical_decimal(self.lat)
    }

    /// Canonical decimal text of the longitude.
    pub fn lon_text(&self) -> String {
        canonical_decimal(self.lon)
    }

    /// Key used to compare coordinates by their canonical text.
    pub fn key(&self) -> CoordinateKey {
        CoordinateKey {
            lat: self.lat_text(),
            lon: self.lon_text(),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat_text(), self.lon_text())
    }
}

/// Canonical text form of a coordinate, used for exact matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoordinateKey {
    pub lat: String,
    pub lon: String,
}

/// Formats a value with the shortest round-trip decimal representation.
///
/// Negative zero is folded into zero so both spellings share one key.
pub fn canonical_decimal(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

/// Rectangle in degrees around a center point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl BoundingBox {
    /// South-west and north-east corners as `[[x_min, y_min], [x_max, y_max]]`.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.x_min, self.y_min], [self.x_max, self.y_max]]
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.6}, {:.6}] x [{:.6}, {:.6}]",
            self.x_min, self.x_max, self.y_min, self.y_max
        )
    }
}
