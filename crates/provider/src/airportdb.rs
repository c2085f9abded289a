//! AirportDB gateway. Token-less: authenticates with a static API key sent
//! as the `apiToken` query parameter.

use crate::http_util::{ProviderHttp, decode_json};
use planetrack_types::{TrackerError, error::Result};
use reqwest::Client;
use secrecy::{ExposeSecret as _, SecretString};
use serde_json::Value;
use std::fmt;

/// Static API key plus the airport endpoint it is valid for.
pub struct AirportDbCredentials {
    api_token: SecretString,
    /// e.g. `https://airportdb.io/api/v1/airport`
    pub base_url: String,
}

impl AirportDbCredentials {
    pub fn new(api_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_token: SecretString::from(api_token.into()),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }
}

impl fmt::Debug for AirportDbCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirportDbCredentials")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

pub struct AirportInfoGateway {
    http: ProviderHttp,
    credentials: AirportDbCredentials,
}

impl AirportInfoGateway {
    pub fn new(http: Client, credentials: AirportDbCredentials) -> Self {
        Self {
            http: ProviderHttp::new(http),
            credentials,
        }
    }

    /// Raw AirportDB JSON for `identifier`.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::InvalidArgument`] for an empty or non-alphanumeric identifier.
    /// - [`TrackerError::UpstreamUnavailable`] on transport failure or timeout.
    /// - [`TrackerError::Upstream`] on a non-2xx response.
    /// - [`TrackerError::Validation`] if the body is not JSON.
    pub async fn get_airport_data(&self, identifier: &str) -> Result<Value> {
        validate_identifier(identifier)?;
        let url = format!("{}/{identifier}", self.credentials.base_url);
        let builder = self
            .http
            .client()
            .get(url)
            .query(&[("apiToken", self.credentials.api_token.expose_secret())]);

        let resp = self.http.send(builder).await?;
        let value: Value = decode_json(resp, "airport").await?;
        tracing::debug!(identifier, "airport data received");
        Ok(value)
    }
}

fn validate_identifier(identifier: &str) -> Result<()> {
    if identifier.is_empty() || !identifier.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(TrackerError::InvalidArgument(format!(
            "airport identifier must be non-empty and alphanumeric, got {identifier:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};

    fn gateway(server: &ServerGuard) -> AirportInfoGateway {
        AirportInfoGateway::new(
            Client::new(),
            AirportDbCredentials::new("db-key", format!("{}/api/v1/airport/", server.url())),
        )
    }

    #[tokio::test]
    async fn test_get_airport_data() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/airport/KJFK")
            .match_query(Matcher::UrlEncoded("apiToken".into(), "db-key".into()))
            .with_status(200)
            .with_body(r#"{"ident":"KJFK","name":"John F Kennedy International Airport","iso_country":"US"}"#)
            .expect(1)
            .create_async()
            .await;

        let value = gateway(&server).get_airport_data("KJFK").await.unwrap();
        mock.assert_async().await;
        assert_eq!(value["ident"], "KJFK");
    }

    #[tokio::test]
    async fn test_no_bearer_header() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/airport/EGLL")
            .match_query(Matcher::Any)
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        gateway(&server).get_airport_data("EGLL").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_is_upstream_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/v1/airport/ZZZZ")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"statusCode":404,"message":"Airport not found"}"#)
            .create_async()
            .await;

        let err = gateway(&server).get_airport_data("ZZZZ").await.unwrap_err();
        match err {
            TrackerError::Upstream { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("Airport not found"));
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_identifier_makes_no_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let gw = gateway(&server);
        for ident in ["", "KJ/FK", "../etc", "KJFK?x=1", "K JFK"] {
            let err = gw.get_airport_data(ident).await.unwrap_err();
            assert!(matches!(err, TrackerError::InvalidArgument(_)), "{ident}");
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_is_unavailable() {
        let gw = AirportInfoGateway::new(
            Client::new(),
            AirportDbCredentials::new("db-key", "http://127.0.0.1:1/airport"),
        );
        let err = gw.get_airport_data("KJFK").await.unwrap_err();
        assert!(matches!(err, TrackerError::UpstreamUnavailable(_)));
    }

    #[test]
    fn test_debug_hides_token() {
        let creds = AirportDbCredentials::new("db-key", "https://airportdb.io/api/v1/airport");
        assert!(!format!("{creds:?}").contains("db-key"));
    }
}
