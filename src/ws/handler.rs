//! Axum WebSocket upgrade handler.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::domain::UserId;
use crate::error::DiscoveryError;

/// Query parameters for the upgrade request.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// User the triage session belongs to.
    pub user_id: String,
}

/// `GET /ws?user_id=` — Upgrade to the triage WebSocket.
///
/// # Errors
///
/// Returns [`DiscoveryError::InvalidRequest`] when `user_id` is blank.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, DiscoveryError> {
    let user_id = params.user_id.trim();
    if user_id.is_empty() {
        return Err(DiscoveryError::InvalidRequest(
            "user_id must not be empty".to_string(),
        ));
    }
    let user_id = UserId::new(user_id);
    let feed_rx = state.feed.subscribe();

    Ok(ws.on_upgrade(move |socket| run_connection(socket, feed_rx, state, user_id)))
}
