//! Earth Engine REST client.
//!
//! # API Endpoints
//!
//! - Compute a value: `POST {base}/v1/projects/{project}/value:compute`
//! - Create a download: `POST {base}/v1/projects/{project}/thumbnails`
//! - Fetch pixels: `GET {base}/v1/{name}:getPixels`
//!
//! All requests carry an OAuth bearer token.

use super::http::AsyncHttpClient;
use super::image::Image;
use super::service::{DownloadParams, ImageryService, ServiceError};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// Default endpoint, suited to many small synchronous requests.
pub const DEFAULT_BASE_URL: &str = "https://earthengine-highvolume.googleapis.com";

/// Connection settings for [`EarthEngineClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct EarthEngineSettings {
    /// API root, without trailing slash
    pub base_url: String,
    /// Cloud project the requests are billed to
    pub project: String,
    /// OAuth access token
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
struct ComputeValueResponse {
    result: Value,
}

#[derive(Debug, Deserialize)]
struct ThumbnailResponse {
    name: String,
}

/// Imagery service backed by the Earth Engine REST API.
pub struct EarthEngineClient<C: AsyncHttpClient> {
    http_client: C,
    settings: EarthEngineSettings,
}

impl<C: AsyncHttpClient> EarthEngineClient<C> {
    pub fn new(http_client: C, settings: EarthEngineSettings) -> Self {
        Self {
            http_client,
            settings,
        }
    }

    fn base_url(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }

    fn project_url(&self, method: &str) -> String {
        format!(
            "{}/v1/projects/{}/{}",
            self.base_url(),
            self.settings.project,
            method
        )
    }

    /// Builds the pixel URL for a thumbnail resource name.
    fn pixels_url(&self, name: &str) -> String {
        format!("{}/v1/{}:getPixels", self.base_url(), name)
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Vec<u8>, ServiceError> {
        let bytes = self
            .http_client
            .post_json_with_bearer(url, &body.to_string(), &self.settings.access_token)
            .await?;
        Ok(bytes)
    }
}

fn parse_json<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, ServiceError> {
    serde_json::from_slice(bytes).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
}

impl<C: AsyncHttpClient> ImageryService for EarthEngineClient<C> {
    async fn band_names(&self, image: &Image) -> Result<Vec<String>, ServiceError> {
        let url = self.project_url("value:compute");
        let body = json!({ "expression": image.band_names().to_graph() });

        let bytes = self.post(&url, &body).await?;
        let response: ComputeValueResponse = parse_json(&bytes)?;

        let names = response
            .result
            .as_array()
            .ok_or_else(|| {
                ServiceError::InvalidResponse(format!(
                    "expected a list of band names, got {}",
                    response.result
                ))
            })?
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    ServiceError::InvalidResponse(format!("band name is not a string: {}", v))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(bands = ?names, "Band names computed");
        Ok(names)
    }

    async fn download_url(
        &self,
        image: &Image,
        params: &DownloadParams,
    ) -> Result<String, ServiceError> {
        let rendered = image
            .clone()
            .reproject(&params.crs)
            .clip_to_bounds_and_scale(&params.region, params.width, params.height);

        let url = self.project_url("thumbnails");
        let body = json!({
            "expression": rendered.expression().to_graph(),
            "fileFormat": "GEO_TIFF",
            "filenamePrefix": params.description,
        });

        let bytes = self.post(&url, &body).await?;
        let response: ThumbnailResponse = parse_json(&bytes)?;

        Ok(self.pixels_url(&response.name))
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        let bytes = self
            .http_client
            .get_with_bearer(url, &self.settings.access_token)
            .await?;
        Ok(bytes)
    }

    fn name(&self) -> &str {
        "Earth Engine"
    }
}
