//! Export pipeline.
//!
//! For each coordinate: build a region around it, composite the filtered
//! collection, check its bands, request a rendered GeoTIFF with retries and
//! write it to the output directory. Optionally repeat for a pan-sharpened
//! rendering.

mod exporter;
mod filename;
mod request;
mod stats;

pub use exporter::{ExportError, ExportOutcome, Exporter, PARTIAL_SUFFIX};
pub use filename::{ExportFileName, RASTER_EXTENSION, SHARPENED_PREFIX};
pub use request::{DateRange, DateRangeError, ExportRequest, ExportSettings, DATE_FORMAT};
pub use stats::{ExportStats, ExportStatsSnapshot};
