//! Geocoding handlers: search, reverse, and the device-location flow.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{GeoSearchParams, PlaceResponse, ReverseParams, ReverseResponse};
use crate::app_state::AppState;
use crate::domain::Coordinate;
use crate::error::{DiscoveryError, ErrorResponse};

/// `GET /geo/search` — Geocode a free-text place query.
///
/// # Errors
///
/// 404 when the query matched nothing (including an empty query, which
/// never reaches the upstream provider); 502 when the round-trip failed.
#[utoipa::path(
    get,
    path = "/api/v1/geo/search",
    tag = "Geo",
    summary = "Geocode a place query",
    params(GeoSearchParams),
    responses(
        (status = 200, description = "Best-matching place", body = PlaceResponse),
        (status = 404, description = "No place matched", body = ErrorResponse),
        (status = 502, description = "Geocoding service failed", body = ErrorResponse),
    )
)]
pub async fn geo_search(
    State(state): State<AppState>,
    Query(params): Query<GeoSearchParams>,
) -> Result<impl IntoResponse, DiscoveryError> {
    let place = state.location.resolve_query(&params.q).await?;
    Ok(Json(PlaceResponse::from(place)))
}

/// `GET /geo/reverse` — Resolve a coordinate to a display address.
///
/// # Errors
///
/// 502 when the round-trip failed.
#[utoipa::path(
    get,
    path = "/api/v1/geo/reverse",
    tag = "Geo",
    summary = "Reverse-geocode a coordinate",
    params(ReverseParams),
    responses(
        (status = 200, description = "Display address", body = ReverseResponse),
        (status = 502, description = "Geocoding service failed", body = ErrorResponse),
    )
)]
pub async fn geo_reverse(
    State(state): State<AppState>,
    Query(params): Query<ReverseParams>,
) -> Result<impl IntoResponse, DiscoveryError> {
    let coordinate = Coordinate::new(params.lat, params.lon);
    let display_name = state.location.describe(coordinate).await?;
    Ok(Json(ReverseResponse {
        coordinate,
        display_name,
    }))
}

/// `GET /geo/device` — The "use my current location" flow.
///
/// # Errors
///
/// 403 when the configured position provider reports permission denied
/// (the client falls back to manual address entry); 502 when the
/// position could not be read.
#[utoipa::path(
    get,
    path = "/api/v1/geo/device",
    tag = "Geo",
    summary = "Resolve the device position",
    responses(
        (status = 200, description = "Device position with display address", body = PlaceResponse),
        (status = 403, description = "Location permission denied", body = ErrorResponse),
        (status = 502, description = "Position could not be read", body = ErrorResponse),
    )
)]
pub async fn geo_device(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, DiscoveryError> {
    let place = state.location.device_place().await?;
    Ok(Json(PlaceResponse::from(place)))
}

/// Geocoding routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/geo/search", get(geo_search))
        .route("/geo/reverse", get(geo_reverse))
        .route("/geo/device", get(geo_device))
}
