//! Positional OpenSky state vectors into [`VectorRecord`]s.

use planetrack_types::{RawStateVectorBatch, VectorRecord};
use serde_json::Value;

/// Entries shorter than this cannot carry `category` and are dropped.
pub const MIN_STATE_FIELDS: usize = 18;

// Positions within a state vector. 4 and 8..=16 are not surfaced.
const ICAO24: usize = 0;
const CALLSIGN: usize = 1;
const ORIGIN_COUNTRY: usize = 2;
const TIME_POSITION: usize = 3;
const LONGITUDE: usize = 5;
const LATITUDE: usize = 6;
const BARO_ALTITUDE: usize = 7;
const CATEGORY: usize = 17;

/// Maps raw state-vector batches to typed records.
pub struct VectorNormalizer;

impl VectorNormalizer {
    /// One record per well-formed entry, in upstream order.
    ///
    /// A missing or empty `states` field yields an empty vector. Malformed
    /// entries are skipped; this never fails.
    #[must_use]
    pub fn normalize_batch(raw: &RawStateVectorBatch) -> Vec<VectorRecord> {
        let Some(states) = raw.states.as_deref() else {
            return Vec::new();
        };
        let records: Vec<VectorRecord> = states
            .iter()
            .enumerate()
            .filter_map(|(idx, state)| {
                let Some(fields) = state.as_array() else {
                    tracing::debug!(index = idx, "dropping state vector that is not an array");
                    return None;
                };
                let record = Self::normalize_state(fields);
                if record.is_none() {
                    tracing::debug!(
                        index = idx,
                        fields = fields.len(),
                        "dropping malformed state vector"
                    );
                }
                record
            })
            .collect();
        if records.len() < states.len() {
            tracing::debug!(
                kept = records.len(),
                dropped = states.len() - records.len(),
                "state vector batch normalized"
            );
        }
        records
    }

    /// Map a single positional entry, or `None` if it is malformed.
    #[must_use]
    pub fn normalize_state(state: &[Value]) -> Option<VectorRecord> {
        if state.len() < MIN_STATE_FIELDS {
            return None;
        }
        Some(VectorRecord {
            icao24: state[ICAO24].as_str()?.to_owned(),
            callsign: callsign(&state[CALLSIGN]),
            origin_country: state[ORIGIN_COUNTRY].as_str()?.to_owned(),
            time_position: integer(&state[TIME_POSITION])?,
            longitude: state[LONGITUDE].as_f64(),
            latitude: state[LATITUDE].as_f64(),
            baro_altitude: state[BARO_ALTITUDE].as_f64()?,
            category: integer(&state[CATEGORY])?,
        })
    }
}

/// OpenSky pads callsigns to eight characters.
fn callsign(value: &Value) -> Option<String> {
    let trimmed = value.as_str()?.trim_end();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Integers, or floats with no fractional part.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f.fract() == 0.0 && f.abs() <= i64::MAX as f64).then_some(f as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn batch(value: Value) -> RawStateVectorBatch {
        serde_json::from_value(value).unwrap()
    }

    fn full_state() -> Value {
        json!([
            "abc123", "UAL1", "US", 1_700_000_000, null, 10.0, 20.0, 5000.0, 0, 0, 0, 0, 0, 0, 0, 0,
            0, 3
        ])
    }

    #[test]
    fn test_drops_short_entry() {
        let raw = batch(json!({ "states": [full_state(), ["short", "entry"]] }));
        let records = VectorNormalizer::normalize_batch(&raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].icao24, "abc123");
        assert_eq!(records[0].category, 3);
    }

    #[test]
    fn test_skips_entries_that_are_not_arrays() {
        let raw = batch(json!({ "states": [null, full_state(), "abc123", { "icao24": "x" }] }));
        let records = VectorNormalizer::normalize_batch(&raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].icao24, "abc123");
    }

    #[test]
    fn test_field_mapping() {
        let raw = batch(json!({ "time": 1_700_000_005, "states": [full_state()] }));
        let records = VectorNormalizer::normalize_batch(&raw);
        assert_eq!(
            records[0],
            VectorRecord {
                icao24: "abc123".into(),
                callsign: Some("UAL1".into()),
                origin_country: "US".into(),
                time_position: 1_700_000_000,
                longitude: Some(10.0),
                latitude: Some(20.0),
                baro_altitude: 5000.0,
                category: 3,
            }
        );
    }

    #[test]
    fn test_empty_and_missing_states() {
        for raw in [json!({}), json!({ "states": [] }), json!({ "time": 1, "states": null })] {
            assert!(VectorNormalizer::normalize_batch(&batch(raw)).is_empty());
        }
        assert!(VectorNormalizer::normalize_batch(&RawStateVectorBatch::default()).is_empty());
    }

    #[test]
    fn test_preserves_upstream_order() {
        let mut second = full_state();
        second[0] = json!("def456");
        let mut third = full_state();
        third[0] = json!("abc123");
        let raw = batch(json!({ "states": [full_state(), second, third] }));
        let ids: Vec<_> = VectorNormalizer::normalize_batch(&raw)
            .into_iter()
            .map(|r| r.icao24)
            .collect();
        assert_eq!(ids, ["abc123", "def456", "abc123"]);
    }

    #[test]
    fn test_callsign_trimmed_or_absent() {
        let mut padded = full_state();
        padded[1] = json!("DLH4AB  ");
        assert_eq!(
            VectorNormalizer::normalize_state(padded.as_array().unwrap())
                .unwrap()
                .callsign
                .as_deref(),
            Some("DLH4AB")
        );

        for blank in [json!("        "), json!(null), json!("")] {
            let mut state = full_state();
            state[1] = blank;
            let record = VectorNormalizer::normalize_state(state.as_array().unwrap()).unwrap();
            assert!(record.callsign.is_none());
        }
    }

    #[test]
    fn test_position_is_optional() {
        let mut state = full_state();
        state[5] = json!(null);
        state[6] = json!(null);
        let record = VectorNormalizer::normalize_state(state.as_array().unwrap()).unwrap();
        assert!(record.longitude.is_none());
        assert!(record.latitude.is_none());
    }

    #[test]
    fn test_bad_required_slot_is_dropped() {
        for (idx, bad) in [
            (0, json!(null)),
            (2, json!(42)),
            (3, json!(null)),
            (3, json!(1.5)),
            (7, json!(null)),
            (17, json!("three")),
        ] {
            let mut state = full_state();
            state[idx] = bad.clone();
            assert!(
                VectorNormalizer::normalize_state(state.as_array().unwrap()).is_none(),
                "slot {idx} = {bad}"
            );
        }
    }

    #[test]
    fn test_whole_floats_accepted_as_integers() {
        let mut state = full_state();
        state[3] = json!(1_700_000_000.0);
        state[17] = json!(2.0);
        let record = VectorNormalizer::normalize_state(state.as_array().unwrap()).unwrap();
        assert_eq!(record.time_position, 1_700_000_000);
        assert_eq!(record.category, 2);
    }

    #[test]
    fn test_integer_altitude_accepted() {
        let mut state = full_state();
        state[7] = json!(11_277);
        let record = VectorNormalizer::normalize_state(state.as_array().unwrap()).unwrap();
        assert!((record.baro_altitude - 11_277.0).abs() < f64::EPSILON);
    }
}
