//! Upstream gateways for OpenSky Network and AirportDB.
//!
//! [`StateVectorGateway`] authenticates every call through the shared
//! [`planetrack_auth::OAuth2Client`]; [`AirportInfoGateway`] uses a static API
//! key. Both return raw upstream payloads; shaping them is left to
//! `planetrack-normalize`.

pub mod airportdb;
pub mod http_util;
pub mod opensky;

pub use airportdb::{AirportDbCredentials, AirportInfoGateway};
pub use http_util::{ProviderHttp, build_client};
pub use opensky::{DEFAULT_HOURS_BACK, MAX_HOURS_BACK, StateVectorGateway};
