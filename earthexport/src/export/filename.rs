//! Deterministic output filenames.
//!
//! Files are named `{dataset}_image_{lat}_{lon}_{start}_{end}.tif`, with a
//! `sharpened_` prefix for pan-sharpened exports. Coordinates are written in
//! canonical decimal form so they parse back to the exact input value.

use super::request::DateRange;
use crate::dataset::DatasetId;
use crate::geometry::Coordinate;

/// Prefix of pan-sharpened exports.
pub const SHARPENED_PREFIX: &str = "sharpened_";

/// Extension of exported rasters.
pub const RASTER_EXTENSION: &str = ".tif";

/// A parsed or generated export filename.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFileName {
    pub sharpened: bool,
    pub dataset: String,
    pub coordinate: Coordinate,
    pub start: String,
    pub end: String,
}

impl ExportFileName {
    /// Name of the primary export for `coordinate`.
    pub fn primary(dataset: DatasetId, coordinate: Coordinate, dates: &DateRange) -> Self {
        Self {
            sharpened: false,
            dataset: dataset.as_str().to_string(),
            coordinate,
            start: dates.start(),
            end: dates.end(),
        }
    }

    /// The sharpened counterpart of this name.
    pub fn to_sharpened(&self) -> Self {
        Self {
            sharpened: true,
            ..self.clone()
        }
    }

    /// Filename without extension, also used as the remote description.
    pub fn stem(&self) -> String {
        format!(
            "{}{}_image_{}_{}_{}_{}",
            if self.sharpened { SHARPENED_PREFIX } else { "" },
            self.dataset,
            self.coordinate.lat_text(),
            self.coordinate.lon_text(),
            self.start,
            self.end
        )
    }

    /// Full filename including extension.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.stem(), RASTER_EXTENSION)
    }

    /// Parses a filename produced by [`ExportFileName::file_name`].
    ///
    /// Also accepts non-canonical decimals such as `36.0`. Returns `None`
    /// for anything that does not follow the pattern.
    pub fn parse(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(RASTER_EXTENSION)?;
        let (sharpened, stem) = match stem.strip_prefix(SHARPENED_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, stem),
        };

        let parts: Vec<&str> = stem.split('_').collect();
        let [dataset, "image", lat, lon, start, end] = parts.as_slice() else {
            return None;
        };

        let lat: f64 = lat.parse().ok().filter(|v: &f64| v.is_finite())?;
        let lon: f64 = lon.parse().ok().filter(|v: &f64| v.is_finite())?;

        Some(Self {
            sharpened,
            dataset: dataset.to_string(),
            coordinate: Coordinate::new(lon, lat),
            start: start.to_string(),
            end: end.to_string(),
        })
    }
}
