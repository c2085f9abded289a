//! Shared HTTP utilities for the upstream gateways.
//!
//! Centralizes client construction, the status check, and JSON decoding so
//! every gateway maps failures into the same error kinds.

use planetrack_types::{
    TrackerError,
    error::{Result, truncate_body},
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use planetrack_types::error::ERROR_BODY_LIMIT;

/// Build the HTTP client shared by every gateway.
///
/// Every request made through it is bounded by `timeout`.
///
/// # Errors
///
/// Returns [`TrackerError::Config`] if the TLS backend cannot be initialized.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("planetrack/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| TrackerError::Config(format!("failed to build HTTP client: {e}")))
}

/// Shared HTTP helper for token-less gateways.
#[derive(Clone)]
pub struct ProviderHttp {
    http: Client,
}

impl ProviderHttp {
    /// Creates a new helper wrapping the given HTTP client.
    #[must_use]
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Returns a reference to the inner HTTP client for building requests.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.http
    }

    /// Sends a request and checks for success status.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::UpstreamUnavailable`] if the request cannot be sent.
    /// - [`TrackerError::Upstream`] on non-2xx responses.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let resp = builder.send().await?;
        ensure_success(resp).await
    }
}

/// Pass 2xx responses through; turn anything else into [`TrackerError::Upstream`].
///
/// # Errors
///
/// Returns [`TrackerError::Upstream`] carrying the status and a truncated body.
pub async fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().path().to_owned();
    let text = resp.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), path = %url, "upstream returned non-success status");
    Err(TrackerError::Upstream {
        status: status.as_u16(),
        body: truncate_body(&text),
    })
}

/// Read the whole body and decode it as `T`.
///
/// # Errors
///
/// - [`TrackerError::UpstreamUnavailable`] if the body cannot be read.
/// - [`TrackerError::Validation`] if it does not match `T`.
pub async fn decode_json<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| TrackerError::Validation(format!("unexpected {what} payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde_json::Value;

    #[test]
    fn test_build_client() {
        assert!(build_client(Duration::from_secs(5)).is_ok());
    }

    #[tokio::test]
    async fn test_send_maps_non_success() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("no such thing")
            .create_async()
            .await;

        let http = ProviderHttp::new(Client::new());
        let err = http
            .send(http.client().get(format!("{}/missing", server.url())))
            .await
            .unwrap_err();
        match err {
            TrackerError::Upstream { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "no such thing");
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_body_is_truncated() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/big")
            .with_status(500)
            .with_body("x".repeat(ERROR_BODY_LIMIT * 2))
            .create_async()
            .await;

        let http = ProviderHttp::new(Client::new());
        let err = http
            .send(http.client().get(format!("{}/big", server.url())))
            .await
            .unwrap_err();
        let TrackerError::Upstream { body, .. } = err else {
            panic!("expected Upstream");
        };
        assert_eq!(body.len(), ERROR_BODY_LIMIT + 3);
    }

    #[tokio::test]
    async fn test_decode_json_rejects_garbage() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/garbage")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let resp = Client::new()
            .get(format!("{}/garbage", server.url()))
            .send()
            .await
            .unwrap();
        let err = decode_json::<Value>(resp, "test").await.unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));
    }
}
