//! API error type that maps [`TrackerError`] variants to HTTP status codes.

use crate::response::ApiResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use planetrack_types::TrackerError;

/// Wrapper around [`TrackerError`] that implements [`IntoResponse`].
#[derive(Debug)]
pub struct ApiError(pub TrackerError);

impl ApiError {
    /// Returns `(status, error_type)` for the wrapped error.
    fn classify(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            TrackerError::UpstreamAuth { .. } => (StatusCode::BAD_GATEWAY, "authentication_error"),
            TrackerError::UpstreamUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "upstream_unavailable")
            }
            TrackerError::Upstream { status, .. } => classify_upstream(*status),
            TrackerError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "invalid_request_error"),
            TrackerError::Validation(_) => (StatusCode::BAD_GATEWAY, "validation_error"),
            TrackerError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

fn classify_upstream(status: u16) -> (StatusCode, &'static str) {
    match status {
        404 => (StatusCode::NOT_FOUND, "not_found"),
        429 => (StatusCode::TOO_MANY_REQUESTS, "rate_limit_error"),
        // our credentials were refused; the caller did nothing wrong
        401 | 403 => (StatusCode::BAD_GATEWAY, "authentication_error"),
        _ => (StatusCode::BAD_GATEWAY, "upstream_error"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.classify();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self.0, "request failed");
        }
        (status, Json(ApiResponse::failure(error_type, self.0.to_string()))).into_response()
    }
}

impl From<TrackerError> for ApiError {
    fn from(e: TrackerError) -> Self {
        Self(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt as _;

    async fn extract_error_body(err: TrackerError) -> (StatusCode, serde_json::Value) {
        let resp = ApiError(err).into_response();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    fn upstream(status: u16) -> TrackerError {
        TrackerError::Upstream {
            status,
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn test_envelope_on_error() {
        let (_, body) = extract_error_body(TrackerError::NotFound("KJFK".into())).await;
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());
        assert_eq!(body["message"], "not found: KJFK");
    }

    #[tokio::test]
    async fn test_auth_error() {
        let (status, body) = extract_error_body(TrackerError::UpstreamAuth {
            status: 401,
            body: "invalid_client".into(),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "authentication_error");
    }

    #[tokio::test]
    async fn test_unavailable_error() {
        let (status, body) =
            extract_error_body(TrackerError::UpstreamUnavailable("timed out".into())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "upstream_unavailable");
    }

    #[tokio::test]
    async fn test_upstream_statuses() {
        for (upstream_status, expected, error_type) in [
            (401, StatusCode::BAD_GATEWAY, "authentication_error"),
            (403, StatusCode::BAD_GATEWAY, "authentication_error"),
            (404, StatusCode::NOT_FOUND, "not_found"),
            (429, StatusCode::TOO_MANY_REQUESTS, "rate_limit_error"),
            (500, StatusCode::BAD_GATEWAY, "upstream_error"),
            (503, StatusCode::BAD_GATEWAY, "upstream_error"),
        ] {
            let (status, body) = extract_error_body(upstream(upstream_status)).await;
            assert_eq!(status, expected, "{upstream_status}");
            assert_eq!(body["error"], error_type, "{upstream_status}");
        }
    }

    #[tokio::test]
    async fn test_invalid_argument_error() {
        let (status, body) =
            extract_error_body(TrackerError::InvalidArgument("lon_min > lon_max".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request_error");
    }

    #[tokio::test]
    async fn test_validation_error() {
        let (status, body) =
            extract_error_body(TrackerError::Validation("missing name".into())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_internal_error() {
        let (status, body) = extract_error_body(TrackerError::Storage("disk full".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal_error");
    }
}
