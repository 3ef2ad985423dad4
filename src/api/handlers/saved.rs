//! Saved-event handlers: list, save, unsave.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::{EventDto, SavedListResponse};
use crate::app_state::AppState;
use crate::domain::{EventId, UserId};
use crate::error::{DiscoveryError, ErrorResponse};

/// `GET /users/{user_id}/saved` — The user's saved events.
///
/// # Errors
///
/// Returns [`DiscoveryError::PersistenceError`] when the saved set
/// cannot be read.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/saved",
    tag = "Saved",
    summary = "List saved events",
    description = "Returns the user's saved events as full objects, most recently saved first. Ids that no longer resolve to a live event are dropped.",
    params(
        ("user_id" = String, Path, description = "User id"),
    ),
    responses(
        (status = 200, description = "The user's saved events", body = SavedListResponse),
        (status = 500, description = "Saved set could not be read", body = ErrorResponse),
    )
)]
pub async fn list_saved(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, DiscoveryError> {
    let user_id = UserId::new(user_id);
    let events = state.saved.list_saved(&user_id).await?;

    let total = u32::try_from(events.len()).unwrap_or(u32::MAX);
    let data: Vec<EventDto> = events
        .into_iter()
        .map(|event| EventDto::from_event(event, Some(true)))
        .collect();

    Ok(Json(SavedListResponse { data, total }))
}

/// `PUT /users/{user_id}/saved/{event_id}` — Save an event (idempotent).
///
/// # Errors
///
/// 404 for an unknown event id; 500 when persistence failed (the
/// optimistic local state has been rolled back).
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/saved/{event_id}",
    tag = "Saved",
    summary = "Save an event",
    description = "Saving an already-saved event is a no-op success.",
    params(
        ("user_id" = String, Path, description = "User id"),
        ("event_id" = String, Path, description = "Event id"),
    ),
    responses(
        (status = 204, description = "Saved (or already saved)"),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Persistence failed, local state rolled back", body = ErrorResponse),
    )
)]
pub async fn save_event(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, DiscoveryError> {
    state
        .saved
        .save(&UserId::new(user_id), &EventId::new(event_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /users/{user_id}/saved/{event_id}` — Unsave an event
/// (idempotent).
///
/// # Errors
///
/// 500 when persistence failed (the optimistic local state has been
/// rolled back).
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}/saved/{event_id}",
    tag = "Saved",
    summary = "Unsave an event",
    description = "Removing a relationship that does not exist is a no-op success.",
    params(
        ("user_id" = String, Path, description = "User id"),
        ("event_id" = String, Path, description = "Event id"),
    ),
    responses(
        (status = 204, description = "Removed (or was never saved)"),
        (status = 500, description = "Persistence failed, local state rolled back", body = ErrorResponse),
    )
)]
pub async fn unsave_event(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, DiscoveryError> {
    state
        .saved
        .unsave(&UserId::new(user_id), &EventId::new(event_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Saved-event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/{user_id}/saved", get(list_saved))
        .route(
            "/users/{user_id}/saved/{event_id}",
            put(save_event).delete(unsave_event),
        )
}
