//! Client-credentials for the OAuth2 token endpoint.
//!
//! Credentials are handed to the client at construction; nothing in this
//! crate reads them from the environment.

use secrecy::{ExposeSecret as _, SecretString};
use std::fmt;

/// `client_id` / `client_secret` plus the endpoint they are exchanged at.
pub struct ClientCredentials {
    /// OAuth 2.0 client ID.
    pub client_id: String,
    client_secret: SecretString,
    /// Token endpoint accepting `grant_type=client_credentials`.
    pub token_url: String,
}

impl ClientCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            token_url: token_url.into(),
        }
    }

    /// Form body for the token request.
    #[must_use]
    pub fn form_params(&self) -> [(&'static str, &str); 3] {
        [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
        ]
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("token_url", &self.token_url)
            .finish()
    }
}
