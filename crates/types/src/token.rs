//! Bearer token representation and expiry logic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default safety margin before `expires_at` at which a token is considered stale.
pub const DEFAULT_EXPIRY_MARGIN_SECS: u64 = 300;

/// Current wall-clock time as Unix seconds.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

/// How to treat a token whose endpoint response carried no `expires_in`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingExpiryPolicy {
    /// Consider the token stale on every check, so each request fetches a new one.
    #[default]
    Refetch,
    /// Trust the token until the upstream rejects it.
    Trust,
}

/// An access token obtained through the client-credentials grant.
///
/// Immutable once issued; a refresh replaces it wholesale.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// Unix seconds at which the token endpoint answered.
    pub fetched_at: u64,
    /// `fetched_at + expires_in`, fixed at issue time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl Token {
    /// Build a token issued at `fetched_at`, deriving `expires_at` from `expires_in`.
    pub fn issued(
        access_token: impl Into<String>,
        token_type: impl Into<String>,
        expires_in: Option<u64>,
        fetched_at: u64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expires_in,
            fetched_at,
            expires_at: expires_in.map(|secs| fetched_at.saturating_add(secs)),
        }
    }

    /// Returns `true` if the token is stale at `now` given a safety margin.
    #[must_use]
    pub fn is_expired_at(&self, now: u64, margin_secs: u64, policy: MissingExpiryPolicy) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at.saturating_sub(margin_secs),
            None => policy == MissingExpiryPolicy::Refetch,
        }
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn authorization_value(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("fetched_at", &self.fetched_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// JSON body returned by an OAuth2 token endpoint.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl TokenResponse {
    /// Stamp the response with its fetch time.
    #[must_use]
    pub fn into_token(self, fetched_at: u64) -> Token {
        Token::issued(
            self.access_token,
            self.token_type,
            self.expires_in,
            fetched_at,
        )
    }
}
