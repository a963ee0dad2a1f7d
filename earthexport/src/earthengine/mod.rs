//! Remote imagery service.
//!
//! The export pipeline depends only on the [`ImageryService`] trait. The
//! production implementation, [`EarthEngineClient`], talks to the Earth
//! Engine REST API through an [`AsyncHttpClient`].
//!
//! ```ignore
//! use earthexport::earthengine::{AsyncReqwestClient, EarthEngineClient, EarthEngineSettings};
//!
//! let http = AsyncReqwestClient::new()?;
//! let service = EarthEngineClient::new(http, settings);
//! let bands = service.band_names(&composite).await?;
//! ```

mod client;
mod expr;
mod http;
mod image;
mod service;

pub use client::{EarthEngineClient, EarthEngineSettings, DEFAULT_BASE_URL};
pub use expr::Expression;
pub use http::{AsyncHttpClient, AsyncReqwestClient, HttpError};
pub use image::{Image, ImageCollection, Region};
pub use service::{DownloadParams, ImageryService, ServiceError};
