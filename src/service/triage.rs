//! Swipe-triage state machine over a filtered deck.
//!
//! A [`TriageController`] is ephemeral, interaction-session state: it
//! holds a cursor over one filtered sequence plus the ids already judged
//! in this session, and is discarded whenever the filter criteria change
//! (the caller builds a fresh controller over the new sequence). Nothing
//! here survives a restart; durable saved state lives exclusively in the
//! [`SavedEventStore`].

use std::collections::HashSet;

use crate::domain::{Event, EventId, UserId};
use crate::service::SavedEventStore;

/// Where the cursor stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriagePhase {
    /// Presenting the card at this deck index.
    Presenting(usize),
    /// The deck is used up; terminal for this filtered sequence.
    Exhausted,
}

/// Result of one gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriageOutcome {
    /// The event the gesture judged, when one was presented.
    pub judged: Option<EventId>,
    /// An accept's save failed remotely. Non-blocking: the cursor has
    /// still advanced and the notice is surfaced alongside the next card.
    pub save_failed: bool,
}

/// Cursor plus per-session judgment history over one filtered deck.
#[derive(Debug)]
pub struct TriageController {
    user_id: UserId,
    deck: Vec<Event>,
    phase: TriagePhase,
    judged: HashSet<EventId>,
}

impl TriageController {
    /// Builds a controller at `Presenting(0)` over the given deck
    /// (immediately `Exhausted` when the deck is empty).
    #[must_use]
    pub fn new(user_id: UserId, deck: Vec<Event>) -> Self {
        let phase = if deck.is_empty() {
            TriagePhase::Exhausted
        } else {
            TriagePhase::Presenting(0)
        };
        Self {
            user_id,
            deck,
            phase,
            judged: HashSet::new(),
        }
    }

    /// Current phase of the session.
    #[must_use]
    pub fn phase(&self) -> TriagePhase {
        self.phase
    }

    /// The card currently presented, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Event> {
        match self.phase {
            TriagePhase::Presenting(index) => self.deck.get(index),
            TriagePhase::Exhausted => None,
        }
    }

    /// Number of cards in the deck.
    #[must_use]
    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    /// Rejects the presented card: marks it judged and advances without
    /// touching the store.
    pub fn reject(&mut self) -> TriageOutcome {
        let Some(event_id) = self.current().map(|event| event.id.clone()) else {
            return TriageOutcome {
                judged: None,
                save_failed: false,
            };
        };
        self.judged.insert(event_id.clone());
        self.advance();
        TriageOutcome {
            judged: Some(event_id),
            save_failed: false,
        }
    }

    /// Accepts the presented card: marks it judged, saves it through the
    /// store, and advances. A failed save is reported as a non-blocking
    /// notice; the cursor advances regardless.
    pub async fn accept(&mut self, store: &SavedEventStore) -> TriageOutcome {
        let Some(event_id) = self.current().map(|event| event.id.clone()) else {
            return TriageOutcome {
                judged: None,
                save_failed: false,
            };
        };
        self.judged.insert(event_id.clone());

        let save_failed = match store.save(&self.user_id, &event_id).await {
            Ok(()) => false,
            Err(error) => {
                tracing::warn!(
                    user_id = %self.user_id,
                    event_id = %event_id,
                    %error,
                    "accept gesture failed to persist"
                );
                true
            }
        };

        self.advance();
        TriageOutcome {
            judged: Some(event_id),
            save_failed,
        }
    }

    /// Moves the cursor forward, skipping cards already judged in this
    /// session so they are never re-presented.
    fn advance(&mut self) {
        let TriagePhase::Presenting(index) = self.phase else {
            return;
        };
        let mut next = index + 1;
        while let Some(event) = self.deck.get(next) {
            if !self.judged.contains(&event.id) {
                self.phase = TriagePhase::Presenting(next);
                return;
            }
            next += 1;
        }
        self.phase = TriagePhase::Exhausted;
    }
}
