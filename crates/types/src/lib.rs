//! Core types and traits for the planetrack workspace.
//!
//! This crate defines the shared abstractions used across all layers of the
//! gateway: the error taxonomy, the bearer token and its expiry rules, query
//! and record types for OpenSky and AirportDB, and the storage traits.

pub mod airport;
pub mod error;
pub mod geo;
pub mod token;
pub mod traits;
pub mod vector;

pub use airport::{AirportPayload, AirportRecord, GeoPoint};
pub use error::{Result, TrackerError};
pub use geo::BoundingBox;
pub use token::{MissingExpiryPolicy, Token, TokenResponse};
pub use traits::{AirportRepository, TokenStore};
pub use vector::{FlightRecord, RawFlightBatch, RawStateVectorBatch, VectorRecord};
