//! HTTP layer: axum router, route handlers, and error mapping.
//!
//! Every route answers with the `{success, message, data}` envelope, both on
//! success and on failure.

mod airports;
mod error;
mod planes;
mod response;

pub use error::ApiError;
pub use response::ApiResponse;

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use planetrack_provider::{AirportInfoGateway, StateVectorGateway};
use planetrack_types::AirportRepository;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared application state passed to all route handlers.
pub struct AppState {
    /// OpenSky gateway; owns the OAuth2 client.
    pub states: Arc<StateVectorGateway>,
    /// AirportDB gateway.
    pub airports: Arc<AirportInfoGateway>,
    /// Stored airport records.
    pub repository: Arc<dyn AirportRepository>,
}

/// Build the full axum router.
///
/// Routes:
/// - GET /
/// - GET /api/v1/planes/vectors/area?lamin&lomin&lamax&lomax
/// - GET /api/v1/planes/vectors
/// - GET /api/v1/planes/vector/{icao24}
/// - GET /api/v1/planes/flights?hours_back=
/// - GET /api/v1/airports/info?icao=
/// - GET /api/v1/airports/{icao}/live
///
/// A CORS layer is added only when `cors_origins` is non-empty.
pub fn make_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let router = Router::new()
        .route("/", get(health))
        .route("/api/v1/planes/vectors/area", get(planes::vectors_in_area))
        .route("/api/v1/planes/vectors", get(planes::all_vectors))
        .route("/api/v1/planes/vector/{icao24}", get(planes::aircraft_vector))
        .route("/api/v1/planes/flights", get(planes::current_flights))
        .route("/api/v1/airports/info", get(airports::airport_info))
        .route("/api/v1/airports/{icao}/live", get(airports::airport_live))
        .with_state(state);

    let router = match cors_layer(cors_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    };
    router.layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if allowed.is_empty() {
        return None;
    }
    Some(
        CorsLayer::new()
            .allow_origin(allowed)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers(Any),
    )
}

async fn health() -> ApiResponse<Value> {
    ApiResponse::ok(json!({"status": "ok"}), "planetrack is running")
}
