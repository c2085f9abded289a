//! Configuration loading for the planetrack gateway.
//!
//! Uses figment to layer built-in defaults, an optional YAML file, and
//! `PLANETRACK_*` environment variables.

pub mod schema;

pub use schema::{AirportDbConfig, Config, HttpConfig, LogConfig, LogFormat, OpenSkyConfig};
