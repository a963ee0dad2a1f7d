//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use earthexport::config::{ConfigFileError, ACCESS_TOKEN_ENV};
use earthexport::driver::DriverError;
use earthexport::earthengine::HttpError;
use earthexport::output::OutputDirError;
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be read or written
    ConfigFile(ConfigFileError),
    /// Required setting missing
    Config(String),
    /// Command-line value rejected
    InvalidArgument(String),
    /// Failed to create the HTTP client
    HttpClient(HttpError),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Batch export aborted
    Export(DriverError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Earth Engine needs a cloud project and an access token:");
                eprintln!("  1. Set project in ~/.earthexport/config.ini or pass --project");
                eprintln!(
                    "  2. Set access_token, export {} or pass --access-token",
                    ACCESS_TOKEN_ENV
                );
                eprintln!("     (e.g. {}=$(gcloud auth print-access-token))", ACCESS_TOKEN_ENV);
            }
            CliError::Export(DriverError::OutputDir(OutputDirError::NotEmpty { .. })) => {
                eprintln!();
                eprintln!("Please delete the output directory before retrying, or drop");
                eprintln!("--redownload to resume from the files already there.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Export(e) => write!(f, "Export failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::HttpClient(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Export(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<DriverError> for CliError {
    fn from(e: DriverError) -> Self {
        CliError::Export(e)
    }
}
