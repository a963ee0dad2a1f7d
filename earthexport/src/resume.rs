//! Resume support.
//!
//! A run that crashed or was interrupted is restarted with the same input and
//! output directory. Coordinates that already have an export on disk are
//! dropped from the work list by parsing the coordinate back out of each
//! filename and comparing canonical decimal text, never floating-point values.

use crate::export::ExportFileName;
use crate::geometry::{Coordinate, CoordinateKey};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors while scanning the output directory.
#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("Failed to scan output directory '{}': {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },
}

/// Coordinates that already have at least one export in a directory.
#[derive(Debug, Clone, Default)]
pub struct ExportedFiles {
    keys: HashSet<CoordinateKey>,
    files: usize,
    unrecognized: Vec<String>,
}

impl ExportedFiles {
    /// Scans `dir` for export files.
    ///
    /// Subdirectories are ignored. Files that do not follow the export naming
    /// pattern are kept aside and reported.
    pub fn scan(dir: &Path) -> Result<Self, ResumeError> {
        let read_err = |source| ResumeError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            if entry.file_type().map_err(read_err)?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        Ok(Self::from_names(names))
    }

    /// Builds the set from bare filenames.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut exported = Self::default();
        for name in names {
            let name = name.as_ref();
            match ExportFileName::parse(name) {
                Some(parsed) => {
                    exported.keys.insert(parsed.coordinate.key());
                    exported.files += 1;
                }
                None => {
                    debug!(file = name, "Not an export file");
                    exported.unrecognized.push(name.to_string());
                }
            }
        }
        exported
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.keys.contains(&coordinate.key())
    }

    /// Number of export files found, sharpened ones included.
    pub fn file_count(&self) -> usize {
        self.files
    }

    /// Number of distinct coordinates with an export.
    pub fn coordinate_count(&self) -> usize {
        self.keys.len()
    }

    pub fn unrecognized(&self) -> &[String] {
        &self.unrecognized
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// What the resume filter did to a work list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeReport {
    /// Work list length before filtering
    pub original: usize,
    /// Work list length after filtering
    pub remaining: usize,
    /// Exported coordinates with no counterpart in the work list
    pub unmatched: Vec<CoordinateKey>,
}

impl ResumeReport {
    pub fn removed(&self) -> usize {
        self.original - self.remaining
    }
}

/// Drops every coordinate in `pending` that already has an export.
///
/// Input order of the survivors is preserved. Exported coordinates that
/// match nothing in the list are logged and otherwise ignored.
pub fn filter_pending(
    pending: Vec<Coordinate>,
    exported: &ExportedFiles,
) -> (Vec<Coordinate>, ResumeReport) {
    let original = pending.len();
    let mut matched: HashSet<CoordinateKey> = HashSet::new();

    let remaining: Vec<Coordinate> = pending
        .into_iter()
        .filter(|coordinate| {
            let key = coordinate.key();
            if exported.keys.contains(&key) {
                matched.insert(key);
                false
            } else {
                true
            }
        })
        .collect();

    let mut unmatched: Vec<CoordinateKey> = exported
        .keys
        .iter()
        .filter(|key| !matched.contains(*key))
        .cloned()
        .collect();
    unmatched.sort_by(|a, b| (&a.lat, &a.lon).cmp(&(&b.lat, &b.lon)));

    for key in &unmatched {
        warn!(
            lat = %key.lat,
            lon = %key.lon,
            "Exported coordinate not found in input; ignoring"
        );
    }

    let report = ResumeReport {
        original,
        remaining: remaining.len(),
        unmatched,
    };

    info!(
        "The original length of coordinate list is: {}",
        report.original
    );
    info!(
        "After removing the ones already downloaded, now there are {} coordinates left",
        report.remaining
    );

    (remaining, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetId;
    use crate::export::DateRange;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn dates() -> DateRange {
        DateRange::parse("2022-03-21", "2022-06-20").unwrap()
    }

    fn file_for(coordinate: Coordinate) -> String {
        ExportFileName::primary(DatasetId::Sentinel, coordinate, &dates()).file_name()
    }

    #[test]
    fn test_removes_exported_coordinates() {
        let coords = vec![
            Coordinate::new(-78.9, 36.0),
            Coordinate::new(-78.8, 36.1),
            Coordinate::new(-78.7, 36.2),
        ];
        let exported = ExportedFiles::from_names([file_for(coords[1])]);

        let (remaining, report) = filter_pending(coords.clone(), &exported);

        assert_eq!(remaining, vec![coords[0], coords[2]]);
        assert_eq!(report.original, 3);
        assert_eq!(report.remaining, 2);
        assert_eq!(report.removed(), 1);
        assert!(report.unmatched.is_empty());
    }

    #[test]
    fn test_sharpened_file_counts_as_exported() {
        let coordinate = Coordinate::new(-78.9, 36.0);
        let sharpened = ExportFileName::primary(DatasetId::Landsat, coordinate, &dates())
            .to_sharpened()
            .file_name();
        let exported = ExportedFiles::from_names([sharpened]);

        assert!(exported.contains(&coordinate));
        let (remaining, _) = filter_pending(vec![coordinate], &exported);
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_non_canonical_filename_still_matches() {
        // Older files may spell 36 as "36.0"
        let exported = ExportedFiles::from_names([
            "sentinel_image_36.0_-78.90_2022-03-21_2022-06-20.tif",
        ]);
        assert!(exported.contains(&Coordinate::new(-78.9, 36.0)));
    }

    #[test]
    fn test_duplicate_input_rows_are_all_removed() {
        let coordinate = Coordinate::new(-78.9, 36.0);
        let exported = ExportedFiles::from_names([file_for(coordinate)]);

        let (remaining, report) =
            filter_pending(vec![coordinate, Coordinate::new(1.0, 2.0), coordinate], &exported);

        assert_eq!(remaining, vec![Coordinate::new(1.0, 2.0)]);
        assert_eq!(report.removed(), 2);
    }

    #[test]
    fn test_unmatched_files_are_reported_not_fatal() {
        let exported = ExportedFiles::from_names([file_for(Coordinate::new(10.0, 20.0))]);

        let (remaining, report) = filter_pending(vec![Coordinate::new(-78.9, 36.0)], &exported);

        assert_eq!(remaining.len(), 1);
        assert_eq!(
            report.unmatched,
            vec![CoordinateKey {
                lat: "20".to_string(),
                lon: "10".to_string()
            }]
        );
    }

    #[test]
    fn test_unrecognized_names_are_kept_aside() {
        let exported = ExportedFiles::from_names(["notes.txt", "sentinel_image_x_y_a_b.tif"]);

        assert!(exported.is_empty());
        assert_eq!(exported.file_count(), 0);
        assert_eq!(exported.unrecognized().len(), 2);
    }

    #[test]
    fn test_partial_write_does_not_count_as_exported() {
        let exported = ExportedFiles::from_names([format!(
            "landsat_image_36_-78.9_2022-03-21_2022-06-20.tif{}",
            crate::export::PARTIAL_SUFFIX
        )]);

        assert!(!exported.contains(&Coordinate::new(-78.9, 36.0)));
        assert_eq!(exported.unrecognized().len(), 1);
    }

    #[test]
    fn test_scan_directory() {
        let dir = TempDir::new().unwrap();
        let a = Coordinate::new(-78.9, 36.0);
        let b = Coordinate::new(-78.8, 36.1);
        std::fs::write(dir.path().join(file_for(a)), b"tif").unwrap();
        std::fs::write(
            dir.path().join(
                ExportFileName::primary(DatasetId::Landsat, a, &dates())
                    .to_sharpened()
                    .file_name(),
            ),
            b"tif",
        )
        .unwrap();
        std::fs::write(dir.path().join(file_for(b)), b"tif").unwrap();
        std::fs::write(dir.path().join("results.txt"), b"").unwrap();
        std::fs::create_dir(dir.path().join(file_for(Coordinate::new(0.5, 0.5)))).unwrap();

        let exported = ExportedFiles::scan(dir.path()).unwrap();

        assert_eq!(exported.file_count(), 3);
        assert_eq!(exported.coordinate_count(), 2);
        assert_eq!(exported.unrecognized(), &["results.txt".to_string()]);
        assert!(!exported.contains(&Coordinate::new(0.5, 0.5)));
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let result = ExportedFiles::scan(&dir.path().join("missing"));
        assert!(matches!(result, Err(ResumeError::ReadDir { .. })));
    }

    fn coordinates() -> impl Strategy<Value = Vec<Coordinate>> {
        prop::collection::hash_set((-1800i32..1800, -900i32..900), 0..40).prop_map(|set| {
            set.into_iter()
                .map(|(lon, lat)| Coordinate::new(lon as f64 / 10.0, lat as f64 / 10.0))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_filter_is_idempotent(coords in coordinates(), take in 0usize..40) {
            let names: Vec<String> = coords.iter().take(take).map(|c| file_for(*c)).collect();
            let exported = ExportedFiles::from_names(&names);

            let (once, _) = filter_pending(coords.clone(), &exported);
            let (twice, _) = filter_pending(once.clone(), &exported);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_leaves_n_minus_m(coords in coordinates(), take in 0usize..40) {
            let m = take.min(coords.len());
            let names: Vec<String> = coords.iter().take(m).map(|c| file_for(*c)).collect();
            let exported = ExportedFiles::from_names(&names);

            let (remaining, report) = filter_pending(coords.clone(), &exported);
            prop_assert_eq!(remaining.len(), coords.len() - m);
            prop_assert_eq!(&remaining[..], &coords[m..]);
            prop_assert!(report.unmatched.is_empty());
        }

        #[test]
        fn prop_arbitrary_floats_round_trip_through_filenames(
            lon in -180.0f64..180.0,
            lat in -90.0f64..90.0,
        ) {
            let coordinate = Coordinate::new(lon, lat);
            let exported = ExportedFiles::from_names([file_for(coordinate)]);
            prop_assert!(exported.contains(&coordinate));
        }
    }
}
