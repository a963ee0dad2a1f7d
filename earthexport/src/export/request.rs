//! Export request types.

use crate::dataset::DatasetId;
use crate::geometry::Coordinate;
use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Date format accepted on input and written into filenames.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors for date range construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DateRangeError {
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Start date {start} must be before end date {end}")]
    Reversed { start: String, end: String },
}

/// Half-open acquisition window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Parses a range from two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, DateRangeError> {
        let parse = |value: &str| {
            NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
                DateRangeError::InvalidDate {
                    value: value.to_string(),
                }
            })
        };
        Self::new(parse(start)?, parse(end)?)
    }

    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start >= end {
            return Err(DateRangeError::Reversed {
                start: start.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start(), self.end())
    }
}

/// Settings shared by every coordinate of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub dataset: DatasetId,
    pub height: u32,
    pub width: u32,
    /// Target projection, e.g. `EPSG:3857`
    pub crs: String,
    pub dates: DateRange,
    pub output_dir: PathBuf,
    /// Also export a pan-sharpened image when the dataset allows it
    pub sharpen: bool,
}

impl ExportSettings {
    /// Builds the request for one coordinate.
    pub fn request_for(&self, coordinate: Coordinate) -> ExportRequest {
        ExportRequest {
            coordinate,
            height: self.height,
            width: self.width,
            dataset: self.dataset,
            crs: self.crs.clone(),
            dates: self.dates,
            output_dir: self.output_dir.clone(),
            sharpen: self.sharpen,
        }
    }
}

/// Everything needed to export one coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub coordinate: Coordinate,
    pub height: u32,
    pub width: u32,
    pub dataset: DatasetId,
    pub crs: String,
    pub dates: DateRange,
    pub output_dir: PathBuf,
    pub sharpen: bool,
}
