//! Per-coordinate export pipeline.

use super::filename::ExportFileName;
use super::request::ExportRequest;
use super::stats::ExportStats;
use crate::dataset::{DatasetProfile, DatasetRegistry};
use crate::earthengine::{DownloadParams, Image, ImageCollection, ImageryService, Region, ServiceError};
use crate::geometry::bounding_box;
use crate::retry::{retry, RetryPolicy};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Suffix of a raster that is still being written.
pub const PARTIAL_SUFFIX: &str = ".part";

/// Failure of a single download.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The remote service failed after retries, or permanently
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The fetched raster could not be written
    #[error("Failed to write '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Result of exporting one coordinate.
///
/// None of these stop the batch; they are reported and the next
/// coordinate is processed.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// The primary raster was written, plus the sharpened one when produced
    Exported { files: Vec<PathBuf> },
    /// The composite lacks a display band, usually no coverage in the window
    MissingBands { available: Vec<String> },
    /// The primary export could not be completed
    Failed { reason: String },
}

impl ExportOutcome {
    pub fn is_exported(&self) -> bool {
        matches!(self, ExportOutcome::Exported { .. })
    }
}

/// Builds composites, requests renders and writes rasters for each request.
///
/// # Example
///
/// ```ignore
/// use earthexport::export::Exporter;
///
/// let exporter = Exporter::new(service, DatasetRegistry::standard(), RetryPolicy::default());
/// let outcome = exporter.export(&settings.request_for(coordinate)).await;
/// ```
pub struct Exporter<S: ImageryService> {
    service: S,
    registry: DatasetRegistry,
    policy: RetryPolicy,
    stats: ExportStats,
}

impl<S: ImageryService> Exporter<S> {
    pub fn new(service: S, registry: DatasetRegistry, policy: RetryPolicy) -> Self {
        Self {
            service,
            registry,
            policy,
            stats: ExportStats::new(),
        }
    }

    pub fn stats(&self) -> &ExportStats {
        &self.stats
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Exports one coordinate.
    pub async fn export(&self, request: &ExportRequest) -> ExportOutcome {
        let coordinate = request.coordinate;
        let profile = self.registry.get(request.dataset);

        let bbox = bounding_box(coordinate.lat, coordinate.lon, request.height, profile.resolution);
        let region = Region::rectangle(&bbox);
        debug!(%coordinate, %bbox, "Region of interest");

        let composite = composite(profile, request, &region);

        let bands = match self.band_names(&composite).await {
            Ok(bands) => bands,
            Err(e) => {
                error!(
                    lat = coordinate.lat,
                    lon = coordinate.lon,
                    dataset = %request.dataset,
                    error = %e,
                    "Failed to list composite bands"
                );
                self.stats.record_failure();
                return ExportOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        if !profile.has_rgb(&bands) {
            info!("Image at {} has bands: {:?}", coordinate, bands);
            self.stats.record_missing_bands();
            return ExportOutcome::MissingBands { available: bands };
        }

        let name = ExportFileName::primary(request.dataset, coordinate, &request.dates);
        let visual = composite.visualize(&profile.rgb, profile.min, profile.max);

        let primary = match self.download(&visual, &name, &region, request).await {
            Ok(path) => path,
            Err(e) => {
                error!(
                    file = %name.file_name(),
                    lat = coordinate.lat,
                    lon = coordinate.lon,
                    dataset = %request.dataset,
                    crs = %request.crs,
                    width = request.width,
                    height = request.height,
                    error = %e,
                    "Export failed"
                );
                self.stats.record_failure();
                return ExportOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let mut files = vec![primary];

        if request.sharpen {
            match profile.available_panchromatic(&bands) {
                Some(pan) => {
                    let sharpened = pan_sharpen(&composite, profile, pan);
                    let sharpened_name = name.to_sharpened();
                    match self.download(&sharpened, &sharpened_name, &region, request).await {
                        Ok(path) => files.push(path),
                        Err(e) => {
                            error!(
                                file = %sharpened_name.file_name(),
                                error = %e,
                                "Sharpened export failed"
                            );
                            self.stats.record_sharpen_failure();
                        }
                    }
                }
                None => {
                    info!(
                        dataset = %request.dataset,
                        "No panchromatic band at {}; skipping sharpening", coordinate
                    );
                }
            }
        }

        ExportOutcome::Exported { files }
    }

    async fn band_names(&self, composite: &Image) -> Result<Vec<String>, ServiceError> {
        let service = &self.service;
        let stats = &self.stats;
        retry(&self.policy, "band_names", move |attempt| {
            if attempt > 1 {
                stats.record_retry();
            }
            service.band_names(composite)
        })
        .await
    }

    /// Requests a fresh URL and fetches it, retrying the pair as one unit.
    async fn download(
        &self,
        image: &Image,
        name: &ExportFileName,
        region: &Region,
        request: &ExportRequest,
    ) -> Result<PathBuf, ExportError> {
        let params = DownloadParams {
            description: name.stem(),
            region: region.clone(),
            crs: request.crs.clone(),
            width: request.width,
            height: request.height,
        };

        let service = &self.service;
        let stats = &self.stats;
        let params = &params;
        let bytes = retry(&self.policy, "download", move |attempt| {
            if attempt > 1 {
                stats.record_retry();
            }
            async move {
                let url = service.download_url(image, params).await?;
                debug!(url = %url, "Download URL issued");
                service.fetch(&url).await
            }
        })
        .await?;

        let path = request.output_dir.join(name.file_name());
        write_raster(&path, &bytes)
            .await
            .map_err(|source| ExportError::Write {
                path: path.clone(),
                source,
            })?;

        self.stats.record_file_written(bytes.len());
        info!("Done: {}", name.stem());
        Ok(path)
    }
}

/// Writes `bytes` to a `.part` sibling and renames it onto `path`.
///
/// Only complete rasters ever carry an export name, so an interrupted or
/// failed write is invisible to the resume scan.
async fn write_raster(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(PARTIAL_SUFFIX);
    let partial = PathBuf::from(partial);

    let result = match tokio::fs::write(&partial, bytes).await {
        Ok(()) => tokio::fs::rename(&partial, path).await,
        Err(e) => Err(e),
    };

    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(&partial).await {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %partial.display(), error = %e, "Failed to remove partial file");
            }
        }
    }
    result
}

/// Median composite of the filtered collection, clipped to `region`.
fn composite(profile: &DatasetProfile, request: &ExportRequest, region: &Region) -> Image {
    let mut collection = ImageCollection::load(profile.collection)
        .filter_date(&request.dates.start(), &request.dates.end())
        .filter_bounds(region);

    if let Some(filter) = &profile.cloud_filter {
        collection = collection.filter_lte(filter.property, filter.max_percent);
    }

    collection.median().clip(region)
}

/// Swaps the value channel of the RGB composite for the panchromatic band.
fn pan_sharpen(composite: &Image, profile: &DatasetProfile, pan: &str) -> Image {
    let hsv = composite.select(&profile.rgb).rgb_to_hsv();
    hsv.select(&["hue"])
        .add_bands(hsv.select(&["saturation"]))
        .add_bands(composite.select(&[pan]))
        .hsv_to_rgb()
}
