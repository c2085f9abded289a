//! AirportDB airport objects into [`AirportRecord`]s.

use planetrack_types::{AirportPayload, AirportRecord, GeoPoint, TrackerError, error::Result};
use serde_json::Value;

/// Validates and reshapes AirportDB payloads.
pub struct AirportNormalizer;

impl AirportNormalizer {
    /// Normalize one airport object.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] if `ident`, `name` or
    /// `iso_country` is missing, blank, or not a string, or if an optional
    /// field has the wrong type.
    pub fn normalize(raw: Value) -> Result<AirportRecord> {
        let payload: AirportPayload = serde_json::from_value(raw)
            .map_err(|e| TrackerError::Validation(format!("invalid airport payload: {e}")))?;

        for (field, value) in [
            ("ident", &payload.ident),
            ("name", &payload.name),
            ("iso_country", &payload.iso_country),
        ] {
            if value.trim().is_empty() {
                return Err(TrackerError::Validation(format!(
                    "invalid airport payload: `{field}` is blank"
                )));
            }
        }

        let location = match (payload.longitude_deg, payload.latitude_deg) {
            (Some(longitude), Some(latitude)) => Some(GeoPoint {
                longitude,
                latitude,
            }),
            _ => None,
        };

        Ok(AirportRecord {
            identifier: payload.ident,
            iata: non_blank(payload.iata_code),
            name: payload.name,
            country: payload.iso_country,
            municipality: non_blank(payload.municipality),
            elevation_ft: payload.elevation_ft,
            location,
        })
    }

    /// Normalize every element. Absent or empty input yields an empty vector.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed element; nothing is skipped.
    pub fn normalize_batch(raw: Option<Vec<Value>>) -> Result<Vec<AirportRecord>> {
        raw.unwrap_or_default()
            .into_iter()
            .map(Self::normalize)
            .collect()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
