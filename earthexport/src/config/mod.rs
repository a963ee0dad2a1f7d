//! Configuration file for earthexport.
//!
//! Settings live in `~/.earthexport/config.ini`. A missing file means
//! defaults; command-line flags override whatever the file provides.
//!
//! # Example
//!
//! ```
//! use earthexport::config::{ConfigFile, DEFAULT_CRS};
//!
//! let config = ConfigFile::default();
//! assert_eq!(config.export.crs, DEFAULT_CRS);
//! assert_eq!(config.retry.policy().max_attempts(), 10);
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, DriverSettings, EngineSettings, ExportFileSettings, LoggingSettings,
    RetrySettings,
};
