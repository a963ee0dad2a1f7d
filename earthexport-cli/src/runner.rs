//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and service creation.

use crate::error::CliError;
use earthexport::config::ConfigFile;
use earthexport::dataset::DatasetId;
use earthexport::earthengine::{AsyncReqwestClient, EarthEngineClient, EarthEngineSettings};
use earthexport::logging::{init_logging, log_file_name, LoggingGuard};
use std::path::Path;
use tracing::info;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Load config and start logging to `{dataset}_logger.log`.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Explicit config file; the default path is used when `None`
    /// * `dataset` - Names the log file
    /// * `verbose` - Mirror log events to stdout
    pub fn new(
        config_path: Option<&Path>,
        dataset: DatasetId,
        verbose: bool,
    ) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };

        let logging_guard = init_logging(
            &config.logging.directory,
            &log_file_name(dataset.as_str()),
            verbose,
        )
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information.
    pub fn log_startup(&self) {
        info!("earthexport v{}", earthexport::VERSION);
        info!(log = %self.logging_guard.path().display(), "Logging started");
    }

    /// Create the Earth Engine client.
    pub fn create_service(
        &self,
        settings: EarthEngineSettings,
    ) -> Result<EarthEngineClient<AsyncReqwestClient>, CliError> {
        let http = AsyncReqwestClient::new().map_err(CliError::HttpClient)?;
        info!(
            project = %settings.project,
            base_url = %settings.base_url,
            "Earth Engine client created"
        );
        Ok(EarthEngineClient::new(http, settings))
    }
}
