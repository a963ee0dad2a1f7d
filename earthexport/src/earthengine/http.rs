//! HTTP client abstraction for testability

use std::future::Future;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Errors from the HTTP transport.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HttpError {
    /// Server answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Request could not be sent or no response arrived
    #[error("Request failed: {0}")]
    Transport(String),

    /// Response body could not be read
    #[error("Failed to read response: {0}")]
    Body(String),

    /// Client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    Build(String),
}

/// Trait for asynchronous HTTP client operations.
///
/// Every request is authenticated with a bearer token, as the imagery
/// service requires for both API calls and pixel downloads.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an authenticated HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    /// * `bearer_token` - The bearer token for Authorization header
    ///
    /// # Returns
    ///
    /// The response body as bytes or an error.
    fn get_with_bearer(
        &self,
        url: &str,
        bearer_token: &str,
    ) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;

    /// Performs an authenticated HTTP POST request with a JSON body.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    /// * `json_body` - JSON body as a string
    /// * `bearer_token` - The bearer token for Authorization header
    fn post_json_with_bearer(
        &self,
        url: &str,
        json_body: &str,
        bearer_token: &str,
    ) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;
}

/// Default User-Agent string for HTTP requests.
const DEFAULT_USER_AGENT: &str = concat!("earthexport/", env!("CARGO_PKG_VERSION"));

/// Async HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new client without a request timeout.
    ///
    /// Transient failures are handled by the caller's retry policy.
    pub fn new() -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        Ok(Self { client })
    }

    async fn read_response(
        url: &str,
        result: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<Vec<u8>, HttpError> {
        let response = match result {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(HttpError::Transport(e.to_string()));
            }
        };

        // Check HTTP status
        if !response.status().is_success() {
            warn!(
                url = url,
                status = response.status().as_u16(),
                "HTTP error status"
            );
            return Err(HttpError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes.to_vec())
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(HttpError::Body(e.to_string()))
            }
        }
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get_with_bearer(&self, url: &str, bearer_token: &str) -> Result<Vec<u8>, HttpError> {
        trace!(url = url, "HTTP GET request starting");

        let result = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", bearer_token))
            .send()
            .await;

        Self::read_response(url, result).await
    }

    async fn post_json_with_bearer(
        &self,
        url: &str,
        json_body: &str,
        bearer_token: &str,
    ) -> Result<Vec<u8>, HttpError> {
        trace!(url = url, "HTTP POST request starting");

        let result = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", bearer_token))
            .header("Content-Type", "application/json")
            .body(json_body.to_string())
            .send()
            .await;

        Self::read_response(url, result).await
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A request seen by [`ScriptedHttpClient`].
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedRequest {
        pub method: &'static str,
        pub url: String,
        pub body: Option<String>,
        pub bearer_token: String,
    }

    /// Mock HTTP client that replays scripted responses in order.
    ///
    /// Once the script is exhausted every request fails with a transport error.
    #[derive(Default)]
    pub struct ScriptedHttpClient {
        responses: Mutex<VecDeque<Result<Vec<u8>, HttpError>>>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl ScriptedHttpClient {
        pub fn new(responses: Vec<Result<Vec<u8>, HttpError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn next(&self, request: RecordedRequest) -> Result<Vec<u8>, HttpError> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::Transport("script exhausted".to_string())))
        }
    }

    impl AsyncHttpClient for ScriptedHttpClient {
        async fn get_with_bearer(
            &self,
            url: &str,
            bearer_token: &str,
        ) -> Result<Vec<u8>, HttpError> {
            self.next(RecordedRequest {
                method: "GET",
                url: url.to_string(),
                body: None,
                bearer_token: bearer_token.to_string(),
            })
        }

        async fn post_json_with_bearer(
            &self,
            url: &str,
            json_body: &str,
            bearer_token: &str,
        ) -> Result<Vec<u8>, HttpError> {
            self.next(RecordedRequest {
                method: "POST",
                url: url.to_string(),
                body: Some(json_body.to_string()),
                bearer_token: bearer_token.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_scripted_client_replays_in_order() {
        let mock = ScriptedHttpClient::new(vec![
            Ok(vec![1, 2]),
            Err(HttpError::Status {
                status: 503,
                url: "http://example.com".to_string(),
            }),
        ]);

        assert_eq!(
            mock.get_with_bearer("http://example.com", "t").await,
            Ok(vec![1, 2])
        );
        assert!(mock.get_with_bearer("http://example.com", "t").await.is_err());
        assert!(matches!(
            mock.get_with_bearer("http://example.com", "t").await,
            Err(HttpError::Transport(_))
        ));
        assert_eq!(mock.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_scripted_client_records_post_body() {
        let mock = ScriptedHttpClient::new(vec![Ok(b"{}".to_vec())]);
        mock.post_json_with_bearer("http://example.com/api", "{\"a\":1}", "secret")
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].body.as_deref(), Some("{\"a\":1}"));
        assert_eq!(requests[0].bearer_token, "secret");
    }

    #[test]
    fn test_status_error_display() {
        let err = HttpError::Status {
            status: 503,
            url: "http://example.com/x".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503 from http://example.com/x");
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(AsyncReqwestClient::new().is_ok());
    }
}
