//! Batch driver.
//!
//! Prepares the output directory, loads the coordinate table, applies the
//! resume filter and exports coordinates one at a time in input order,
//! pausing between coordinates to stay under the remote rate limit.

use crate::dataset::DatasetId;
use crate::earthengine::ImageryService;
use crate::export::{ExportOutcome, ExportSettings, ExportStatsSnapshot, Exporter};
use crate::geometry::Coordinate;
use crate::input::{read_coordinates, InputError};
use crate::output::{count_files, prepare_output_dir, OutputDirError, OutputMode};
use crate::resume::{filter_pending, ExportedFiles, ResumeError};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Default pause between coordinates.
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_secs(1);

/// Default file the summary line is appended to.
pub const DEFAULT_RESULTS_FILE: &str = "results.txt";

/// Fatal batch errors. Per-coordinate failures never end up here.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    OutputDir(#[from] OutputDirError),

    #[error(transparent)]
    Resume(#[from] ResumeError),

    #[error("Failed to append to results file '{}': {source}", path.display())]
    Results { path: PathBuf, source: io::Error },
}

/// Driver behavior independent of the export itself.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig {
    rate_limit: Duration,
    results_file: PathBuf,
    parallel: bool,
    parallel_number: usize,
}

impl DriverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_results_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.results_file = path.into();
        self
    }

    /// Records the parallel request. Export is always sequential.
    pub fn with_parallel(mut self, parallel: bool, parallel_number: usize) -> Self {
        self.parallel = parallel;
        self.parallel_number = parallel_number;
        self
    }

    pub fn rate_limit(&self) -> Duration {
        self.rate_limit
    }

    pub fn results_file(&self) -> &Path {
        &self.results_file
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            rate_limit: DEFAULT_RATE_LIMIT,
            results_file: PathBuf::from(DEFAULT_RESULTS_FILE),
            parallel: false,
            parallel_number: 10,
        }
    }
}

/// Per-outcome tallies for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub exported: usize,
    pub missing_bands: usize,
    pub failed: usize,
}

impl OutcomeCounts {
    fn record(&mut self, outcome: &ExportOutcome) {
        match outcome {
            ExportOutcome::Exported { .. } => self.exported += 1,
            ExportOutcome::MissingBands { .. } => self.missing_bands += 1,
            ExportOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Result of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub elapsed: Duration,
    /// Files present in the output directory at the end of the run
    pub downloaded: usize,
    /// Input rows, doubled when sharpening
    pub requested: usize,
    pub input: String,
    pub dataset: DatasetId,
    /// Coordinates skipped because they were already exported
    pub resumed: usize,
    pub outcomes: OutcomeCounts,
    pub stats: ExportStatsSnapshot,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.elapsed.as_secs_f64();
        write!(
            f,
            "Export complete! It took {:.2} s ({:.2} min) to download {} images out of {} requested from {} using the {} dataset",
            secs,
            secs / 60.0,
            self.downloaded,
            self.requested,
            self.input,
            self.dataset
        )
    }
}

/// Runs a whole export batch.
pub struct BatchRunner<S: ImageryService> {
    exporter: Exporter<S>,
    settings: ExportSettings,
    config: DriverConfig,
}

impl<S: ImageryService> BatchRunner<S> {
    pub fn new(exporter: Exporter<S>, settings: ExportSettings, config: DriverConfig) -> Self {
        Self {
            exporter,
            settings,
            config,
        }
    }

    pub fn exporter(&self) -> &Exporter<S> {
        &self.exporter
    }

    /// Exports every coordinate of `input` that is not already on disk.
    ///
    /// The summary line is logged and appended to the results file.
    pub async fn run(&self, input: &Path, mode: OutputMode) -> Result<RunSummary, DriverError> {
        let output_dir = &self.settings.output_dir;
        prepare_output_dir(output_dir, mode)?;

        let coordinates = read_coordinates(input)?;
        let requested = if self.settings.sharpen {
            coordinates.len() * 2
        } else {
            coordinates.len()
        };

        let (pending, resumed) = match mode {
            OutputMode::Resume => {
                let exported = ExportedFiles::scan(output_dir)?;
                let (pending, report) = filter_pending(coordinates, &exported);
                (pending, report.removed())
            }
            OutputMode::Redownload => (coordinates, 0),
        };

        if self.config.parallel {
            warn!(
                workers = self.config.parallel_number,
                "Parallel export is not available; processing sequentially"
            );
        }

        info!(
            service = self.exporter.service().name(),
            dataset = %self.settings.dataset,
            pending = pending.len(),
            "Starting export"
        );
        let start = tokio::time::Instant::now();
        let outcomes = self.export_all(&pending).await;
        let elapsed = start.elapsed();

        let stats = self.exporter.stats().snapshot();
        let downloaded = match count_files(output_dir) {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "Could not count output files, reporting files written this run");
                stats.files_written as usize
            }
        };

        let summary = RunSummary {
            elapsed,
            downloaded,
            requested,
            input: input.display().to_string(),
            dataset: self.settings.dataset,
            resumed,
            outcomes,
            stats,
        };

        info!("{}", summary);
        self.append_result(&summary).await?;
        Ok(summary)
    }

    /// Exports `coordinates` in order with the rate-limit pause after each.
    ///
    /// Nothing in here stops the batch; per-coordinate problems end up in the
    /// returned counts or the log.
    pub async fn export_all(&self, coordinates: &[Coordinate]) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        let total = coordinates.len();

        for (row, coordinate) in coordinates.iter().enumerate() {
            let request = self.settings.request_for(*coordinate);
            let outcome = self.exporter.export(&request).await;
            counts.record(&outcome);

            tokio::time::sleep(self.config.rate_limit).await;

            info!(row, total, "Finished rows: {}", row);
            match count_files(&self.settings.output_dir) {
                Ok(downloaded) => info!("Downloaded {} images so far", downloaded),
                Err(e) => warn!(error = %e, "Could not count output files"),
            }
        }

        counts
    }

    async fn append_result(&self, summary: &RunSummary) -> Result<(), DriverError> {
        let path = self.config.results_file();
        let results_err = |source| DriverError::Results {
            path: path.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(results_err)?;
        file.write_all(format!("{}\n", summary).as_bytes())
            .await
            .map_err(results_err)?;
        file.flush().await.map_err(results_err)
    }
}
