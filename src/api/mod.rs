//! HTTP client for the Nimbus API.
//!
//! Carries the bearer token, maps non-2xx responses and transport failures
//! into [`ApiError`], and optionally traces every request. Service modules
//! ([`servers`], [`volumes`], [`volume_actions`]) build on the request
//! helpers here.

pub mod paginate;
pub mod servers;
pub mod volume_actions;
pub mod volumes;

pub use paginate::{paginate, Page};

use crate::observability::TraceLogger;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.nimbus.dev";

/// Result type for remote API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors from the remote API boundary
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response
    #[error("request failed: {0}")]
    Transport(String),

    /// The API answered with a non-2xx status
    #[error("API error ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message extracted from the error body, or the status text
        message: String,
    },

    /// The response body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// A page traversal failed mid-way (malformed continuation token,
    /// unreachable next page)
    #[error("pagination failed: {0}")]
    Pagination(String),
}

/// Error body shape the API uses for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the Nimbus HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
    trace: Option<TraceLogger>,
}

impl ApiClient {
    /// Create a client against `base_url` authenticating with `token`.
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            http: reqwest::Client::new(),
            trace: None,
        }
    }

    /// Attach a trace logger recording every request and response.
    pub fn with_trace(mut self, trace: TraceLogger) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Resolve `path_or_url` against the base URL. Absolute URLs (pagination
    /// cursors) pass through untouched.
    fn url(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else {
            format!("{}/{}", self.base_url, path_or_url.trim_start_matches('/'))
        }
    }

    async fn send(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<serde_json::Value>,
        query: &[(&str, &str)],
    ) -> ApiResult<reqwest::Response> {
        if let Some(trace) = &self.trace {
            trace.request(method.as_str(), url);
        }

        let mut req = self
            .http
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token));
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let response = req.send().await.map_err(|e| {
            if let Some(trace) = &self.trace {
                trace.error(&e.to_string());
            }
            ApiError::Transport(e.to_string())
        })?;

        if let Some(trace) = &self.trace {
            trace.response(response.status().as_u16(), url);
        }

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            };
            return Err(ApiError::Status { status: status.as_u16(), message });
        }

        Ok(response)
    }

    /// GET `path_or_url` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path_or_url: &str) -> ApiResult<T> {
        self.get_json_with_query(path_or_url, &[]).await
    }

    /// GET with query parameters and decode the JSON body.
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path_or_url: &str,
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        let url = self.url(path_or_url);
        let response = self.send(reqwest::Method::GET, &url, None, query).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = self.url(path);
        let body = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        let response = self
            .send(reqwest::Method::POST, &url, Some(body), &[])
            .await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// POST a JSON body, discarding the response payload.
    pub async fn post_action<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<()> {
        let url = self.url(path);
        let body = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.send(reqwest::Method::POST, &url, Some(body), &[])
            .await?;
        Ok(())
    }

    /// DELETE `path`, optionally with a JSON body.
    pub async fn delete(&self, path: &str, body: Option<serde_json::Value>) -> ApiResult<()> {
        let url = self.url(path);
        self.send(reqwest::Method::DELETE, &url, body, &[]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let client = ApiClient::new("https://api.nimbus.dev/", "tok");
        assert_eq!(client.url("v2/servers"), "https://api.nimbus.dev/v2/servers");
        assert_eq!(client.url("/v2/servers"), "https://api.nimbus.dev/v2/servers");
        // Pagination cursors are absolute and pass through
        assert_eq!(
            client.url("https://api.nimbus.dev/v2/servers?page=2"),
            "https://api.nimbus.dev/v2/servers?page=2"
        );
    }

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status { status: 404, message: "not found".into() };
        assert_eq!(err.to_string(), "API error (404): not found");
    }
}
