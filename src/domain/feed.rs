//! Broadcast channel for saved-set changes.
//!
//! [`ChangeFeed`] wraps a [`tokio::sync::broadcast`] channel. The
//! [`crate::service::SavedEventStore`] publishes a [`SavedSetChange`] for
//! every local mutation (and every rollback), and each WebSocket connection
//! subscribes to keep its client's views in sync.

use tokio::sync::broadcast;

use super::SavedSetChange;

/// Broadcast bus for [`SavedSetChange`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity.
/// When the ring buffer is full, the oldest changes are dropped for lagging
/// receivers; receivers observe the lag and can re-read the saved list.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<SavedSetChange>,
}

impl ChangeFeed {
    /// Creates a new `ChangeFeed` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes a change to all subscribers.
    ///
    /// Returns the number of receivers that received the change. If there
    /// are no active receivers, the change is silently dropped.
    pub fn publish(&self, change: SavedSetChange) -> usize {
        self.sender.send(change).unwrap_or(0)
    }

    /// Creates a new receiver that will observe all future changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SavedSetChange> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{EventId, UserId};
    use chrono::Utc;

    fn make_change(user: &str) -> SavedSetChange {
        SavedSetChange::Saved {
            user_id: UserId::new(user),
            event_id: EventId::new("e1"),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let feed = ChangeFeed::new(16);
        assert_eq!(feed.publish(make_change("u1")), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_change() {
        let feed = ChangeFeed::new(16);
        let mut rx = feed.subscribe();

        feed.publish(make_change("u1"));

        let change = rx.recv().await;
        let Ok(change) = change else {
            panic!("expected to receive change");
        };
        assert_eq!(change.user_id(), &UserId::new("u1"));
    }

    #[tokio::test]
    async fn all_subscribers_receive_every_change() {
        let feed = ChangeFeed::new(16);
        let mut rx1 = feed.subscribe();
        let mut rx2 = feed.subscribe();

        let count = feed.publish(make_change("u2"));
        assert_eq!(count, 2);

        let c1 = rx1.recv().await;
        let c2 = rx2.recv().await;
        let (Ok(c1), Ok(c2)) = (c1, c2) else {
            panic!("both receivers should observe the change");
        };
        assert_eq!(c1.kind(), c2.kind());
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let feed = ChangeFeed::new(16);
        assert_eq!(feed.receiver_count(), 0);

        let rx = feed.subscribe();
        assert_eq!(feed.receiver_count(), 1);

        drop(rx);
        assert_eq!(feed.receiver_count(), 0);
    }
}
