//! Airport metadata, as served by AirportDB and as exposed internally.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// Internal airport representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportRecord {
    /// ICAO-style identifier (`ident` upstream).
    pub identifier: String,
    pub iata: Option<String>,
    pub name: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    #[serde(default)]
    pub municipality: Option<String>,
    #[serde(default)]
    pub elevation_ft: Option<i32>,
    pub location: Option<GeoPoint>,
}

impl AirportRecord {
    /// Convert back into the AirportDB wire schema.
    #[must_use]
    pub fn to_wire(&self) -> AirportPayload {
        AirportPayload {
            ident: self.identifier.clone(),
            iata_code: self.iata.clone(),
            name: self.name.clone(),
            iso_country: self.country.clone(),
            municipality: self.municipality.clone(),
            elevation_ft: self.elevation_ft,
            latitude_deg: self.location.map(|p| p.latitude),
            longitude_deg: self.location.map(|p| p.longitude),
        }
    }
}

/// The subset of an AirportDB airport object this system reads.
///
/// Unknown upstream fields (runways, frequencies, navaids, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportPayload {
    pub ident: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iata_code: Option<String>,
    pub name: String,
    pub iso_country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_i32",
        skip_serializing_if = "Option::is_none"
    )]
    pub elevation_ft: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude_deg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude_deg: Option<f64>,
}

/// AirportDB serves some integers as strings (`"elevation_ft": "13"`).
fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
