//! Unified error type for the planetrack workspace.

use thiserror::Error;

/// Enumerates all error kinds that can occur across planetrack crates.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The token endpoint rejected the client-credentials exchange.
    #[error("authentication error: status={status}, body={body}")]
    UpstreamAuth { status: u16, body: String },

    /// Connection, timeout, or transport failure reaching an upstream.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// A data endpoint returned a non-success status.
    #[error("upstream error: status={status}, body={body}")]
    Upstream { status: u16, body: String },

    /// Caller-supplied input was rejected before any network call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An upstream payload did not match the expected schema.
    #[error("validation error: {0}")]
    Validation(String),

    /// JSON serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persistent storage (`SQLite`) error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration loading or validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A looked-up record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

// ── Feature-gated From impls ──────────────────────────────────────────────────

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for TrackerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Validation(e.to_string())
        } else {
            Self::UpstreamUnavailable(e.to_string())
        }
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for TrackerError {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl TrackerError {
    /// Returns `true` if the error is likely transient and worth retrying
    /// at a higher layer. Nothing inside the workspace retries on its own.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Upstream { status, .. } => matches!(status, 408 | 429 | 500 | 502 | 503 | 504),
            Self::UpstreamUnavailable(_) => true,
            _ => false,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Upstream error bodies are cut to this many characters.
pub const ERROR_BODY_LIMIT: usize = 512;

/// Cut an upstream error body to [`ERROR_BODY_LIMIT`] characters.
///
/// Multi-byte characters are never split.
#[must_use]
pub fn truncate_body(text: &str) -> String {
    truncate(text, ERROR_BODY_LIMIT)
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(status: u16) -> TrackerError {
        TrackerError::Upstream {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        // multi-byte characters are never split
        assert_eq!(truncate("ééé", 2), "éé...");
        assert_eq!(truncate_body(&"y".repeat(ERROR_BODY_LIMIT)).len(), ERROR_BODY_LIMIT);
        assert_eq!(
            truncate_body(&"y".repeat(ERROR_BODY_LIMIT + 1)).len(),
            ERROR_BODY_LIMIT + 3
        );
    }

    #[test]
    fn test_error_display_upstream_auth() {
        let err = TrackerError::UpstreamAuth {
            status: 401,
            body: "invalid_client".to_string(),
        };
        let s = err.to_string();
        assert!(s.starts_with("authentication error"));
        assert!(s.contains("401"));
        assert!(s.contains("invalid_client"));
    }

    #[test]
    fn test_error_display_upstream() {
        let err = TrackerError::Upstream {
            status: 503,
            body: "maintenance".to_string(),
        };
        let s = err.to_string();
        assert!(s.contains("503"));
        assert!(s.contains("maintenance"));
    }

    #[test]
    fn test_error_display_invalid_argument() {
        let err = TrackerError::InvalidArgument("lon_min > lon_max".into());
        assert_eq!(err.to_string(), "invalid argument: lon_min > lon_max");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid {{{").unwrap_err();
        let err: TrackerError = json_err.into();
        assert!(matches!(err, TrackerError::Serialization(_)));
    }

    #[test]
    fn test_is_retryable_upstream() {
        for status in [408, 429, 500, 502, 503, 504] {
            assert!(upstream(status).is_retryable(), "{status} should retry");
        }
        for status in [400, 401, 403, 404] {
            assert!(!upstream(status).is_retryable(), "{status} should not retry");
        }
    }

    #[test]
    fn test_is_retryable_transport() {
        assert!(TrackerError::UpstreamUnavailable("timed out".into()).is_retryable());
    }

    #[test]
    fn test_is_retryable_other_errors() {
        assert!(
            !TrackerError::UpstreamAuth {
                status: 401,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(!TrackerError::InvalidArgument("bad".into()).is_retryable());
        assert!(!TrackerError::Validation("bad".into()).is_retryable());
        assert!(!TrackerError::Config("bad".into()).is_retryable());
    }
}
