//! Default values for all configuration settings.

use std::path::PathBuf;

use super::settings::*;
use crate::driver::{self, DEFAULT_RESULTS_FILE};
use crate::earthengine::DEFAULT_BASE_URL;
use crate::retry;

/// Default target projection (Web Mercator).
pub const DEFAULT_CRS: &str = "EPSG:3857";

/// Default output height and width in pixels.
pub const DEFAULT_IMAGE_SIZE: u32 = 512;

/// Default total attempts per remote call.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = retry::DEFAULT_MAX_ATTEMPTS;

/// Default delay before the first retry, in seconds.
pub const DEFAULT_RETRY_BASE_DELAY_SECS: u64 = retry::DEFAULT_BASE_DELAY.as_secs();

/// Default backoff multiplier.
pub const DEFAULT_RETRY_MULTIPLIER: f64 = retry::DEFAULT_MULTIPLIER;

/// Largest accepted `[retry] max_attempts`.
pub const MAX_RETRY_ATTEMPTS: u32 = 100;

/// Largest accepted `[retry] multiplier`.
pub const MAX_RETRY_MULTIPLIER: f64 = 10.0;

/// Default pause between coordinates, in seconds.
pub const DEFAULT_RATE_LIMIT_SECS: u64 = driver::DEFAULT_RATE_LIMIT.as_secs();

/// Environment variable consulted for the access token.
pub const ACCESS_TOKEN_ENV: &str = "EARTHENGINE_TOKEN";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            earthengine: EngineSettings {
                project: None,
                access_token: None,
                base_url: DEFAULT_BASE_URL.to_string(),
            },
            export: ExportFileSettings {
                crs: DEFAULT_CRS.to_string(),
                height: DEFAULT_IMAGE_SIZE,
                width: DEFAULT_IMAGE_SIZE,
            },
            retry: RetrySettings {
                max_attempts: DEFAULT_RETRY_ATTEMPTS,
                base_delay_secs: DEFAULT_RETRY_BASE_DELAY_SECS,
                multiplier: DEFAULT_RETRY_MULTIPLIER,
            },
            driver: DriverSettings {
                rate_limit_secs: DEFAULT_RATE_LIMIT_SECS,
                results_file: PathBuf::from(DEFAULT_RESULTS_FILE),
            },
            logging: LoggingSettings {
                directory: PathBuf::from("."),
            },
        }
    }
}
