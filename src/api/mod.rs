//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource routes (events, saved sets, geo) are versioned under
//! `/api/v1`; the health check and category catalog stay at the root so
//! probes and clients need no version knowledge.

pub mod dto;
pub mod handlers;

use axum::Router;

use crate::app_state::AppState;

/// Builds the REST router. The WebSocket upgrade route is mounted
/// separately by the binary.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
