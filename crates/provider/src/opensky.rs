//! OpenSky Network data gateway.
//!
//! All calls go through [`OAuth2Client::authorized_get`], so a stale token is
//! refreshed before the data request is dispatched. Nothing here retries.

use crate::http_util::{decode_json, ensure_success};
use planetrack_auth::OAuth2Client;
use planetrack_types::{
    BoundingBox, RawFlightBatch, RawStateVectorBatch, TrackerError, error::Result,
    token::unix_now,
};
use std::sync::Arc;

pub const DEFAULT_HOURS_BACK: f64 = 1.0;
/// `flights/all` rejects intervals longer than two hours.
pub const MAX_HOURS_BACK: f64 = 2.0;

const STATES_PATH: &str = "/states/all";
const FLIGHTS_PATH: &str = "/flights/all";

pub struct StateVectorGateway {
    auth: Arc<OAuth2Client>,
    base_url: String,
}

impl StateVectorGateway {
    /// `base_url` is the API root, e.g. `https://opensky-network.org/api`.
    pub fn new(auth: Arc<OAuth2Client>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { auth, base_url }
    }

    /// The OAuth2 client this gateway authenticates with.
    #[must_use]
    pub fn auth(&self) -> &Arc<OAuth2Client> {
        &self.auth
    }

    /// State vectors inside `bbox`.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::InvalidArgument`] for a malformed box, before any request.
    /// - Auth and transport errors from [`OAuth2Client`].
    /// - [`TrackerError::Upstream`] on a non-2xx response.
    /// - [`TrackerError::Validation`] if the body is not a state-vector batch.
    pub async fn get_state_vectors_area(&self, bbox: &BoundingBox) -> Result<RawStateVectorBatch> {
        bbox.validate()?;
        self.fetch_states(&bbox.query_params()).await
    }

    /// Every state vector the upstream currently knows about.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_state_vectors_area`], minus the box check.
    pub async fn get_all_state_vectors(&self) -> Result<RawStateVectorBatch> {
        self.fetch_states(&[]).await
    }

    /// The current state vector of one aircraft.
    ///
    /// `icao24` is the six-digit hex transponder address; it is sent
    /// lowercased. An aircraft the upstream is not tracking yields a batch
    /// without states.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::InvalidArgument`] for a malformed address, before any request.
    /// - Otherwise as [`Self::get_state_vectors_area`].
    pub async fn get_state_vector(&self, icao24: &str) -> Result<RawStateVectorBatch> {
        let icao24 = parse_icao24(icao24)?;
        self.fetch_states(&[("icao24", icao24)]).await
    }

    async fn fetch_states(&self, query: &[(&str, String)]) -> Result<RawStateVectorBatch> {
        let url = format!("{}{STATES_PATH}", self.base_url);
        let resp = self.auth.authorized_get(&url, query).await?;
        let resp = ensure_success(resp).await?;
        let batch: RawStateVectorBatch = decode_json(resp, "state vector").await?;
        tracing::debug!(
            time = ?batch.time,
            states = batch.states.as_ref().map_or(0, Vec::len),
            "state vectors received"
        );
        Ok(batch)
    }

    /// Flights seen in the last `hours_back` hours.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::InvalidArgument`] unless `0 < hours_back <= 2`.
    /// - Otherwise as [`Self::get_state_vectors_area`].
    pub async fn get_current_flights(&self, hours_back: f64) -> Result<RawFlightBatch> {
        let (begin, end) = flight_window(unix_now(), hours_back)?;
        let url = format!("{}{FLIGHTS_PATH}", self.base_url);
        let query = [("begin", begin.to_string()), ("end", end.to_string())];

        let resp = self.auth.authorized_get(&url, &query).await?;
        let resp = ensure_success(resp).await?;
        let flights: RawFlightBatch = decode_json(resp, "flight").await?;
        tracing::debug!(begin, end, flights = flights.len(), "flights received");
        Ok(flights)
    }
}

fn parse_icao24(raw: &str) -> Result<String> {
    let id = raw.trim();
    if id.len() == 6 && id.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(id.to_ascii_lowercase())
    } else {
        Err(TrackerError::InvalidArgument(format!(
            "icao24 must be six hex digits, got {raw:?}"
        )))
    }
}

/// `(begin, end)` in epoch seconds for a window ending at `now`.
fn flight_window(now: u64, hours_back: f64) -> Result<(u64, u64)> {
    if !hours_back.is_finite() || hours_back <= 0.0 || hours_back > MAX_HOURS_BACK {
        return Err(TrackerError::InvalidArgument(format!(
            "hours_back must be in (0, {MAX_HOURS_BACK}], got {hours_back}"
        )));
    }
    // bounded above by MAX_HOURS_BACK * 3600, so the cast is exact enough
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let window = (hours_back * 3600.0) as u64;
    Ok((now.saturating_sub(window), now))
}
