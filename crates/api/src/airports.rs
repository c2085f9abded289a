//! `/api/v1/airports/*` handlers.

use crate::{AppState, error::ApiError, planes::bad_query, response::ApiResponse};
use axum::extract::{Path, Query, State, rejection::QueryRejection};
use planetrack_normalize::AirportNormalizer;
use planetrack_types::{AirportRecord, TrackerError};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct InfoQuery {
    pub icao: String,
}

/// Handles `GET /api/v1/airports/info`: a stored record from the repository.
pub async fn airport_info(
    State(state): State<Arc<AppState>>,
    query: Result<Query<InfoQuery>, QueryRejection>,
) -> Result<ApiResponse<AirportRecord>, ApiError> {
    let Query(q) = query.map_err(|e| bad_query(&e))?;
    let icao = q.icao.trim();
    if icao.is_empty() {
        return Err(TrackerError::InvalidArgument("icao must not be empty".into()).into());
    }
    let record = state
        .repository
        .find_by_icao(icao)
        .await?
        .ok_or_else(|| TrackerError::NotFound(format!("airport {icao}")))?;
    Ok(ApiResponse::ok(record, "Airport data retrieved successfully"))
}

/// Handles `GET /api/v1/airports/{icao}/live`: fetched from AirportDB now.
pub async fn airport_live(
    State(state): State<Arc<AppState>>,
    Path(icao): Path<String>,
) -> Result<ApiResponse<AirportRecord>, ApiError> {
    let raw = state.airports.get_airport_data(&icao).await?;
    let record = AirportNormalizer::normalize(raw)?;
    Ok(ApiResponse::ok(record, "Airport data retrieved successfully"))
}
