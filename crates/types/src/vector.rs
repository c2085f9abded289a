//! OpenSky state-vector and flight payloads, raw and normalized.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `GET /states/all`.
///
/// Each entry of `states` should be a positional array whose layout is fixed
/// by the upstream; see [`crate::VectorRecord`] for the slots that are
/// surfaced. Entries are kept as raw values so one bad entry cannot reject
/// the whole body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStateVectorBatch {
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub states: Option<Vec<Value>>,
}

/// One aircraft position after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub icao24: String,
    pub callsign: Option<String>,
    pub origin_country: String,
    pub time_position: i64,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub baro_altitude: f64,
    pub category: i64,
}

/// A flight as reported by `GET /flights/all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    pub icao24: String,
    #[serde(default)]
    pub first_seen: Option<i64>,
    #[serde(default)]
    pub last_seen: Option<i64>,
    #[serde(default)]
    pub callsign: Option<String>,
    #[serde(default)]
    pub est_departure_airport: Option<String>,
    #[serde(default)]
    pub est_arrival_airport: Option<String>,
}

/// Body of `GET /flights/all`.
pub type RawFlightBatch = Vec<FlightRecord>;
