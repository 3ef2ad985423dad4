//! WebSocket layer: the triage session protocol and the saved-set
//! change feed.
//!
//! The endpoint at `/ws?user_id=` carries triage commands
//! (apply_filters, accept, reject, current) and forwards every
//! [`crate::domain::SavedSetChange`] for the connection's user.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod session;
