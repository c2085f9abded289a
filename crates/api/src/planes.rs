//! `/api/v1/planes/*` handlers.

use crate::{AppState, error::ApiError, response::ApiResponse};
use axum::extract::{Path, Query, State, rejection::QueryRejection};
use planetrack_normalize::VectorNormalizer;
use planetrack_provider::DEFAULT_HOURS_BACK;
use planetrack_types::{BoundingBox, FlightRecord, RawStateVectorBatch, TrackerError, VectorRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct AreaQuery {
    pub lamin: f64,
    pub lomin: f64,
    pub lamax: f64,
    pub lomax: f64,
}

#[derive(Debug, Deserialize)]
pub struct FlightsQuery {
    pub hours_back: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct VectorsOut {
    pub vectors: Vec<VectorRecord>,
}

impl From<&RawStateVectorBatch> for VectorsOut {
    fn from(raw: &RawStateVectorBatch) -> Self {
        Self {
            vectors: VectorNormalizer::normalize_batch(raw),
        }
    }
}

/// Query-string errors answer with the envelope like every other failure.
pub(crate) fn bad_query(rejection: &QueryRejection) -> ApiError {
    ApiError(TrackerError::InvalidArgument(rejection.body_text()))
}

/// Handles `GET /api/v1/planes/vectors/area`.
pub async fn vectors_in_area(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AreaQuery>, QueryRejection>,
) -> Result<ApiResponse<VectorsOut>, ApiError> {
    let Query(q) = query.map_err(|e| bad_query(&e))?;
    let bbox = BoundingBox::new(q.lomin, q.lamin, q.lomax, q.lamax);
    let raw = state.states.get_state_vectors_area(&bbox).await?;
    Ok(ApiResponse::ok(
        VectorsOut::from(&raw),
        "Vectors in area retrieved successfully",
    ))
}

/// Handles `GET /api/v1/planes/vectors`.
pub async fn all_vectors(
    State(state): State<Arc<AppState>>,
) -> Result<ApiResponse<VectorsOut>, ApiError> {
    let raw = state.states.get_all_state_vectors().await?;
    Ok(ApiResponse::ok(
        VectorsOut::from(&raw),
        "Vectors retrieved successfully",
    ))
}

/// Handles `GET /api/v1/planes/vector/{icao24}`.
pub async fn aircraft_vector(
    State(state): State<Arc<AppState>>,
    Path(icao24): Path<String>,
) -> Result<ApiResponse<VectorsOut>, ApiError> {
    let raw = state.states.get_state_vector(&icao24).await?;
    Ok(ApiResponse::ok(
        VectorsOut::from(&raw),
        "Vector retrieved successfully",
    ))
}

/// Handles `GET /api/v1/planes/flights`.
pub async fn current_flights(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FlightsQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<FlightRecord>>, ApiError> {
    let Query(q) = query.map_err(|e| bad_query(&e))?;
    let flights = state
        .states
        .get_current_flights(q.hours_back.unwrap_or(DEFAULT_HOURS_BACK))
        .await?;
    Ok(ApiResponse::ok(flights, "Flights retrieved successfully"))
}
