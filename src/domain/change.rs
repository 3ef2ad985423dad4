//! Saved-set change notifications.
//!
//! Every mutation of a user's saved set — including optimistic updates that
//! are later rolled back — emits a [`SavedSetChange`] through the
//! [`super::ChangeFeed`]. WebSocket connections forward the changes for
//! their user so every open view (list, swipe deck) reflects the same
//! saved state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{EventId, UserId};

/// A single change to a user's saved-event set.
///
/// The rolled-back variants are compensations: they follow an optimistic
/// `Saved`/`Unsaved` whose remote persistence failed, and tell views to
/// revert the indicator for that event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum SavedSetChange {
    /// The user saved an event (optimistically applied).
    Saved {
        /// Owner of the saved set.
        user_id: UserId,
        /// Event that was saved.
        event_id: EventId,
        /// When the change was applied locally.
        timestamp: DateTime<Utc>,
    },
    /// The user removed an event from their saved set.
    Unsaved {
        /// Owner of the saved set.
        user_id: UserId,
        /// Event that was unsaved.
        event_id: EventId,
        /// When the change was applied locally.
        timestamp: DateTime<Utc>,
    },
    /// A prior `Saved` failed to persist and was reverted.
    SaveRolledBack {
        /// Owner of the saved set.
        user_id: UserId,
        /// Event whose save was reverted.
        event_id: EventId,
        /// When the rollback was applied.
        timestamp: DateTime<Utc>,
    },
    /// A prior `Unsaved` failed to persist and was reverted.
    UnsaveRolledBack {
        /// Owner of the saved set.
        user_id: UserId,
        /// Event whose unsave was reverted.
        event_id: EventId,
        /// When the rollback was applied.
        timestamp: DateTime<Utc>,
    },
}

impl SavedSetChange {
    /// Returns the user whose saved set changed.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        match self {
            Self::Saved { user_id, .. }
            | Self::Unsaved { user_id, .. }
            | Self::SaveRolledBack { user_id, .. }
            | Self::UnsaveRolledBack { user_id, .. } => user_id,
        }
    }

    /// Returns the event the change concerns.
    #[must_use]
    pub fn event_id(&self) -> &EventId {
        match self {
            Self::Saved { event_id, .. }
            | Self::Unsaved { event_id, .. }
            | Self::SaveRolledBack { event_id, .. }
            | Self::UnsaveRolledBack { event_id, .. } => event_id,
        }
    }

    /// Returns the change kind as a static string slice.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Saved { .. } => "saved",
            Self::Unsaved { .. } => "unsaved",
            Self::SaveRolledBack { .. } => "save_rolled_back",
            Self::UnsaveRolledBack { .. } => "unsave_rolled_back",
        }
    }

    /// `true` when the change leaves the event saved for the user.
    #[must_use]
    pub const fn is_saved_afterwards(&self) -> bool {
        matches!(self, Self::Saved { .. } | Self::UnsaveRolledBack { .. })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn change(kind: &str) -> SavedSetChange {
        let user_id = UserId::new("u1");
        let event_id = EventId::new("e1");
        let timestamp = Utc::now();
        match kind {
            "saved" => SavedSetChange::Saved {
                user_id,
                event_id,
                timestamp,
            },
            "unsaved" => SavedSetChange::Unsaved {
                user_id,
                event_id,
                timestamp,
            },
            "save_rolled_back" => SavedSetChange::SaveRolledBack {
                user_id,
                event_id,
                timestamp,
            },
            _ => SavedSetChange::UnsaveRolledBack {
                user_id,
                event_id,
                timestamp,
            },
        }
    }

    #[test]
    fn kind_strings_match_variants() {
        for kind in ["saved", "unsaved", "save_rolled_back", "unsave_rolled_back"] {
            assert_eq!(change(kind).kind(), kind);
        }
    }

    #[test]
    fn saved_afterwards_tracks_net_effect() {
        assert!(change("saved").is_saved_afterwards());
        assert!(change("unsave_rolled_back").is_saved_afterwards());
        assert!(!change("unsaved").is_saved_afterwards());
        assert!(!change("save_rolled_back").is_saved_afterwards());
    }

    #[test]
    fn serializes_with_change_tag() {
        let json = serde_json::to_string(&change("saved")).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        assert!(json.contains("\"change\":\"saved\""));
        assert!(json.contains("\"event_id\":\"e1\""));
    }
}
