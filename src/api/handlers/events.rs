//! Event discovery handlers: filtered list and single-event detail.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    DiscoverParams, EventDto, EventListResponse, PaginationParams, paginate,
};
use crate::app_state::AppState;
use crate::domain::{EventId, UserId};
use crate::error::{DiscoveryError, ErrorResponse};

/// `GET /events` — Filtered, ordered event discovery.
///
/// # Errors
///
/// Validation errors for bad categories, buckets, or center parameters;
/// 404/502 when a `near` query fails to geocode (the client keeps its
/// previous results in that case — nothing here is destructive).
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Discover events",
    description = "Applies the category, text, date-bucket, and radius filters over the active event set and returns one page of the ordered result.",
    params(DiscoverParams),
    responses(
        (status = 200, description = "One page of filtered events", body = EventListResponse),
        (status = 400, description = "Invalid filter parameter", body = ErrorResponse),
        (status = 404, description = "The `near` query matched no place", body = ErrorResponse),
        (status = 502, description = "Geocoding the `near` query failed", body = ErrorResponse),
    )
)]
pub async fn discover_events(
    State(state): State<AppState>,
    Query(params): Query<DiscoverParams>,
) -> Result<impl IntoResponse, DiscoveryError> {
    let criteria = state
        .location
        .resolve_criteria(&params.to_criteria_request())
        .await?;

    let events = state.discovery.discover(&criteria).await;

    let saved_ids = match &params.user_id {
        Some(user_id) if !user_id.trim().is_empty() => {
            let user_id = UserId::new(user_id.trim());
            let ids = state.saved.saved_ids(&user_id).await?;
            Some(ids.into_iter().collect::<std::collections::HashSet<_>>())
        }
        _ => None,
    };

    let pagination = PaginationParams {
        page: params.page.unwrap_or(1),
        per_page: params.per_page.unwrap_or(20),
    };
    let (page, meta) = paginate(events, &pagination);

    let data: Vec<EventDto> = page
        .into_iter()
        .map(|event| {
            let saved = saved_ids.as_ref().map(|ids| ids.contains(&event.id));
            EventDto::from_event(event, saved)
        })
        .collect();

    Ok(Json(EventListResponse {
        data,
        pagination: meta,
    }))
}

/// `GET /events/{id}` — Single event detail.
///
/// # Errors
///
/// Returns [`DiscoveryError::EventNotFound`] if the id does not resolve.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Get event details",
    params(
        ("id" = String, Path, description = "Event id"),
    ),
    responses(
        (status = 200, description = "Event details", body = EventDto),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DiscoveryError> {
    let event_id = EventId::new(id);
    let event = state
        .discovery
        .catalog()
        .get(&event_id)
        .await
        .ok_or(DiscoveryError::EventNotFound(event_id))?;

    Ok(Json(EventDto::from_event(event, None)))
}

/// Event discovery routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(discover_events))
        .route("/events/{id}", get(get_event))
}
