//! Run-wide export statistics.
//!
//! Counters are atomic so the exporter can record through a shared reference.

use std::sync::atomic::{AtomicU64, Ordering};

/// Accumulated export counters for one run.
///
/// # Example
///
/// ```
/// use earthexport::export::ExportStats;
///
/// let stats = ExportStats::new();
/// stats.record_file_written(1024);
/// stats.record_retry();
///
/// let snapshot = stats.snapshot();
/// assert_eq!(snapshot.files_written, 1);
/// assert_eq!(snapshot.bytes_written, 1024);
/// ```
#[derive(Debug, Default)]
pub struct ExportStats {
    /// Raster files written (primary and sharpened)
    files_written: AtomicU64,
    /// Total bytes written to disk
    bytes_written: AtomicU64,
    /// Coordinates skipped because the composite lacked display bands
    missing_bands: AtomicU64,
    /// Coordinates whose primary export failed
    failures: AtomicU64,
    /// Sharpened exports that failed after the primary succeeded
    sharpen_failures: AtomicU64,
    /// Retry attempts across all remote calls
    retries: AtomicU64,
}

/// Snapshot of [`ExportStats`] at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportStatsSnapshot {
    pub files_written: u64,
    pub bytes_written: u64,
    pub missing_bands: u64,
    pub failures: u64,
    pub sharpen_failures: u64,
    pub retries: u64,
}

impl ExportStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raster file of `bytes` bytes written to disk.
    pub fn record_file_written(&self, bytes: usize) {
        self.files_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record a coordinate skipped for missing bands.
    pub fn record_missing_bands(&self) {
        self.missing_bands.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a coordinate whose primary export failed.
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed sharpened export.
    pub fn record_sharpen_failure(&self) {
        self.sharpen_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a retry attempt.
    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> ExportStatsSnapshot {
        ExportStatsSnapshot {
            files_written: self.files_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            missing_bands: self.missing_bands.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            sharpen_failures: self.sharpen_failures.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }
}
