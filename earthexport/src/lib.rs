//! earthexport - Satellite imagery export around coordinates
//!
//! For every coordinate in a CSV table this library builds a square region
//! sized to the requested output, composites Landsat, Sentinel-2 or NAIP
//! scenes over a date range on Google Earth Engine, and writes the rendered
//! GeoTIFF to a local directory. Interrupted runs resume from the files
//! already on disk.
//!
//! # High-Level API
//!
//! ```ignore
//! use earthexport::dataset::DatasetRegistry;
//! use earthexport::driver::{BatchRunner, DriverConfig};
//! use earthexport::earthengine::{AsyncReqwestClient, EarthEngineClient};
//! use earthexport::export::Exporter;
//! use earthexport::output::OutputMode;
//! use earthexport::retry::RetryPolicy;
//!
//! let service = EarthEngineClient::new(AsyncReqwestClient::new()?, engine_settings);
//! let exporter = Exporter::new(service, DatasetRegistry::standard(), RetryPolicy::default());
//! let runner = BatchRunner::new(exporter, export_settings, DriverConfig::default());
//! let summary = runner.run(Path::new("coordinates.csv"), OutputMode::Resume).await?;
//! println!("{}", summary);
//! ```

pub mod config;
pub mod dataset;
pub mod driver;
pub mod earthengine;
pub mod export;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod output;
pub mod resume;
pub mod retry;

/// Version of the earthexport library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
