//! Imagery service abstraction.

use super::http::HttpError;
use super::image::{Image, Region};
use std::future::Future;
use thiserror::Error;

/// Errors from the remote imagery service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// Transport or status failure
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The service answered with something we could not interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ServiceError {
    /// Returns true if the failure may succeed on a later attempt.
    ///
    /// Network failures and any non-2xx status are transient; a response we
    /// cannot parse will not improve by asking again.
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Http(HttpError::Build(_)) => false,
            ServiceError::Http(_) => true,
            ServiceError::InvalidResponse(_) => false,
        }
    }
}

/// Parameters of a rendered GeoTIFF download.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadParams {
    /// Name used as the remote filename prefix
    pub description: String,
    /// Region to clip and scale to
    pub region: Region,
    /// Target coordinate reference system, e.g. `EPSG:3857`
    pub crs: String,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
}

/// The remote capability the export pipeline depends on.
///
/// Implementors evaluate image expressions remotely: listing bands of a
/// composite, issuing short-lived download URLs for rendered GeoTIFFs and
/// fetching the rendered bytes.
pub trait ImageryService: Send + Sync {
    /// Evaluates the band names of `image`.
    fn band_names(
        &self,
        image: &Image,
    ) -> impl Future<Output = Result<Vec<String>, ServiceError>> + Send;

    /// Requests a download URL for `image` rendered per `params`.
    fn download_url(
        &self,
        image: &Image,
        params: &DownloadParams,
    ) -> impl Future<Output = Result<String, ServiceError>> + Send;

    /// Fetches the bytes behind a download URL.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ServiceError>> + Send;

    /// Service name for logging.
    fn name(&self) -> &str;
}
