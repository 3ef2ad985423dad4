//! WebSocket message types: envelope, commands, and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server-originated message with a fresh envelope id.
    #[must_use]
    pub fn server(msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds a response echoing the command's envelope id.
    #[must_use]
    pub fn response(command_id: String, payload: serde_json::Value) -> Self {
        Self {
            id: command_id,
            msg_type: WsMessageType::Response,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error message echoing the command's envelope id.
    #[must_use]
    pub fn error(command_id: String, code: u32, message: &str) -> Self {
        Self {
            id: command_id,
            msg_type: WsMessageType::Error,
            timestamp: Utc::now(),
            payload: serde_json::json!({ "code": code, "message": message }),
        }
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands a client can send over the triage WebSocket.
///
/// Gestures are inherently serialized: the per-connection read loop
/// handles one command at a time, so two rapid gestures on the same
/// card can never both fire against the same deck index.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Replace the filter criteria and rebuild the triage deck.
    ApplyFilters {
        /// Category identifiers.
        #[serde(default)]
        categories: Vec<String>,
        /// Free-text search.
        #[serde(default)]
        q: String,
        /// Date bucket identifier.
        #[serde(default)]
        date_bucket: Option<String>,
        /// Free-text place to geocode into a center.
        #[serde(default)]
        near: Option<String>,
        /// Pre-resolved center latitude.
        #[serde(default)]
        lat: Option<f64>,
        /// Pre-resolved center longitude.
        #[serde(default)]
        lon: Option<f64>,
        /// Radius in miles.
        #[serde(default)]
        radius_miles: Option<f64>,
    },
    /// Accept the presented card (save it) and advance.
    Accept,
    /// Reject the presented card and advance.
    Reject,
    /// Re-send the presented card.
    Current,
}
