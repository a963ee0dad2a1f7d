//! CLI command implementations.
//!
//! - [`export`] - Batch export (the default when no subcommand is given)
//! - [`config`] - Configuration file management (init, path)

pub mod config;
pub mod export;
