//! Coordinate table loading.
//!
//! The input is a CSV file with a header row. Every following row carries
//! longitude in the first column and latitude in the second; further columns
//! are ignored.

use crate::geometry::Coordinate;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors while reading the coordinate table.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to open '{}': {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: expected longitude and latitude columns, found {found}")]
    MissingColumns { line: u64, found: usize },

    #[error("Line {line}: {column} '{value}' is not a finite number")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },
}

/// Reads all coordinates from the CSV file at `path`.
pub fn read_coordinates(path: &Path) -> Result<Vec<Coordinate>, InputError> {
    let file = std::fs::File::open(path).map_err(|source| InputError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let coordinates = read_coordinates_from(file)?;
    info!(
        path = %path.display(),
        count = coordinates.len(),
        "Loaded coordinates"
    );
    Ok(coordinates)
}

/// Reads coordinates from any CSV source. The first row is a header.
pub fn read_coordinates_from<R: io::Read>(reader: R) -> Result<Vec<Coordinate>, InputError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    rdr.records()
        .map(|result| parse_record(&result?))
        .collect()
}

fn parse_record(record: &StringRecord) -> Result<Coordinate, InputError> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);

    let (Some(lon), Some(lat)) = (record.get(0), record.get(1)) else {
        return Err(InputError::MissingColumns {
            line,
            found: record.len(),
        });
    };

    Ok(Coordinate::new(
        parse_number(lon, line, "longitude")?,
        parse_number(lat, line, "latitude")?,
    ))
}

fn parse_number(value: &str, line: u64, column: &'static str) -> Result<f64, InputError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| InputError::InvalidNumber {
            line,
            column,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reads_lon_lat_rows() {
        let csv = "lon,lat\n-78.9,36.0\n-78.85,35.95\n";
        let coords = read_coordinates_from(csv.as_bytes()).unwrap();
        assert_eq!(
            coords,
            vec![Coordinate::new(-78.9, 36.0), Coordinate::new(-78.85, 35.95)]
        );
    }

    #[test]
    fn test_extra_columns_and_whitespace() {
        let csv = "lon, lat, name\n -78.9 , 36.0 , durham\n";
        let coords = read_coordinates_from(csv.as_bytes()).unwrap();
        assert_eq!(coords, vec![Coordinate::new(-78.9, 36.0)]);
    }

    #[test]
    fn test_header_only_is_empty() {
        let coords = read_coordinates_from("lon,lat\n".as_bytes()).unwrap();
        assert!(coords.is_empty());
    }

    #[test]
    fn test_non_numeric_value_reports_line() {
        let csv = "lon,lat\n-78.9,36.0\nabc,36.1\n";
        let err = read_coordinates_from(csv.as_bytes()).unwrap_err();
        match err {
            InputError::InvalidNumber {
                line,
                column,
                value,
            } => {
                assert_eq!(line, 3);
                assert_eq!(column, "longitude");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_short_row_is_rejected() {
        let csv = "lon,lat\n-78.9\n";
        let err = read_coordinates_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            InputError::MissingColumns { line: 2, found: 1 }
        ));
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let csv = "lon,lat\nNaN,36.0\n";
        assert!(matches!(
            read_coordinates_from(csv.as_bytes()),
            Err(InputError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_read_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("coords.csv");
        std::fs::write(&path, "lon,lat\n1.5,2.5\n").unwrap();

        let coords = read_coordinates(&path).unwrap();
        assert_eq!(coords, vec![Coordinate::new(1.5, 2.5)]);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_coordinates(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, InputError::Open { .. }));
        assert!(err.to_string().contains("nope.csv"));
    }
}
