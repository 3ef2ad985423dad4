//! Saved-event DTOs.

use serde::Serialize;

use super::event_dto::EventDto;

/// Response for `GET /api/v1/users/{user_id}/saved`.
///
/// Full event objects, most recently saved first. Saved ids that no
/// longer resolve to a live event are dropped server-side, so `total`
/// counts only the events actually returned.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SavedListResponse {
    /// The user's saved events.
    pub data: Vec<EventDto>,
    /// Number of events returned.
    pub total: u32,
}
