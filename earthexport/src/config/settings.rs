//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use crate::driver::DriverConfig;
use crate::retry::RetryPolicy;
use std::path::PathBuf;
use std::time::Duration;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Earth Engine access
    pub earthengine: EngineSettings,
    /// Output image defaults
    pub export: ExportFileSettings,
    /// Backoff for remote calls
    pub retry: RetrySettings,
    /// Batch loop settings
    pub driver: DriverSettings,
    /// Log file location
    pub logging: LoggingSettings,
}

/// `[earthengine]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Cloud project that owns the Earth Engine quota
    pub project: Option<String>,
    /// OAuth2 access token; `EARTHENGINE_TOKEN` or `--access-token` also work
    pub access_token: Option<String>,
    /// API root
    pub base_url: String,
}

/// `[export]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFileSettings {
    /// Target coordinate reference system
    pub crs: String,
    /// Output height in pixels
    pub height: u32,
    /// Output width in pixels
    pub width: u32,
}

/// `[retry]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    /// Total attempts per remote call
    pub max_attempts: u32,
    /// Delay before the first retry, in seconds
    pub base_delay_secs: u64,
    /// Growth factor between delays
    pub multiplier: f64,
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_secs(self.base_delay_secs),
            self.multiplier,
        )
    }
}

/// `[driver]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverSettings {
    /// Pause between coordinates, in seconds
    pub rate_limit_secs: u64,
    /// File the summary line is appended to
    pub results_file: PathBuf,
}

impl DriverSettings {
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig::new()
            .with_rate_limit(Duration::from_secs(self.rate_limit_secs))
            .with_results_file(self.results_file.clone())
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Directory holding `{dataset}_logger.log`
    pub directory: PathBuf,
}
