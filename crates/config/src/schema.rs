use planetrack_types::{MissingExpiryPolicy, TrackerError, token::DEFAULT_EXPIRY_MARGIN_SECS};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path};

/// Prefix for environment overrides, e.g. `PLANETRACK_OPENSKY__CLIENT_ID`.
pub const ENV_PREFIX: &str = "PLANETRACK_";

const OPENSKY_TOKEN_URL: &str =
    "https://auth.opensky-network.org/auth/realms/opensky-network/protocol/openid-connect/token";
const OPENSKY_API_BASE_URL: &str = "https://opensky-network.org/api";
const AIRPORTDB_BASE_URL: &str = "https://airportdb.io/api/v1/airport";

fn default_token_url() -> String {
    OPENSKY_TOKEN_URL.to_string()
}
fn default_api_base_url() -> String {
    OPENSKY_API_BASE_URL.to_string()
}
fn default_airportdb_base_url() -> String {
    AIRPORTDB_BASE_URL.to_string()
}
fn default_expiry_margin() -> u64 {
    DEFAULT_EXPIRY_MARGIN_SECS
}

/// OpenSky Network client-credentials and endpoints.
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenSkyConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Seconds before expiry at which a token is refreshed (defaults to 300).
    #[serde(default = "default_expiry_margin")]
    pub expiry_margin_secs: u64,
    /// What to do with tokens that arrive without `expires_in`.
    #[serde(default)]
    pub missing_expiry: MissingExpiryPolicy,
}

impl Default for OpenSkyConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
            expiry_margin_secs: default_expiry_margin(),
            missing_expiry: MissingExpiryPolicy::default(),
        }
    }
}

impl fmt::Debug for OpenSkyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenSkyConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .field("expiry_margin_secs", &self.expiry_margin_secs)
            .field("missing_expiry", &self.missing_expiry)
            .finish()
    }
}

/// AirportDB API token and endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct AirportDbConfig {
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_airportdb_base_url")]
    pub base_url: String,
}

impl Default for AirportDbConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_url: default_airportdb_base_url(),
        }
    }
}

impl fmt::Debug for AirportDbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirportDbConfig")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn default_timeout_secs() -> u64 {
    10
}

/// Settings shared by every upstream HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout for upstream calls (defaults to 10 s).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listen port (defaults to 8000).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Listen address (defaults to `127.0.0.1`).
    #[serde(default = "default_host")]
    pub host: String,
    /// Origins allowed by CORS. Empty disables the CORS layer.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// `SQLite` file holding stored airports. `None` keeps them in memory.
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub opensky: OpenSkyConfig,
    #[serde(default)]
    pub airportdb: AirportDbConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            cors_origins: Vec::new(),
            database: None,
            log: LogConfig::default(),
            http: HttpConfig::default(),
            opensky: OpenSkyConfig::default(),
            airportdb: AirportDbConfig::default(),
        }
    }
}

impl Config {
    /// Parses configuration from a YAML string, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the YAML is invalid or extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml(yaml: &str) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .extract()
    }

    /// Loads configuration from a file path, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: &Path) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .extract()
    }

    /// Layers defaults, an optional YAML file, then `PLANETRACK_*` environment
    /// variables (`__` separates nested keys).
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if a source cannot be parsed.
    #[allow(clippy::result_large_err)]
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Env, Format as _, Serialized, Yaml},
        };
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "loading configuration file");
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }

    /// Reject settings the gateways cannot run with.
    ///
    /// Empty credentials are allowed here; the upstream rejects them at call time.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.http.timeout_secs == 0 {
            return Err(TrackerError::Config(
                "http.timeout_secs must be greater than zero".into(),
            ));
        }
        let urls = [
            ("opensky.token_url", &self.opensky.token_url),
            ("opensky.api_base_url", &self.opensky.api_base_url),
            ("airportdb.base_url", &self.airportdb.base_url),
        ];
        for (key, url) in urls {
            if url.trim().is_empty() {
                return Err(TrackerError::Config(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }
}
