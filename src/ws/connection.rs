//! WebSocket connection loop.
//!
//! Runs the read/write loop for a single connection: incoming triage
//! commands are handled one at a time through the [`TriageSession`]
//! (which is what serializes rapid gestures), and saved-set changes for
//! the connection's user are forwarded from the change feed so every
//! open view converges on the same saved state.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::session::TriageSession;
use crate::app_state::AppState;
use crate::domain::{SavedSetChange, UserId};
use crate::service::CriteriaRequest;

/// Runs the loop until the client disconnects or the feed closes.
pub async fn run_connection(
    socket: WebSocket,
    mut feed_rx: broadcast::Receiver<SavedSetChange>,
    state: AppState,
    user_id: UserId,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut session = TriageSession::new(user_id);

    loop {
        tokio::select! {
            // Incoming command from the client.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut session, &state).await;
                        let Some(json) = serde_json::to_string(&response).ok() else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Saved-set change from the feed.
            change = feed_rx.recv() => {
                match change {
                    Ok(change) => {
                        if change.user_id() != session.user_id() {
                            continue;
                        }
                        let payload = serde_json::to_value(&change).unwrap_or_default();
                        let msg = WsMessage::server(WsMessageType::Event, payload);
                        let json = serde_json::to_string(&msg).unwrap_or_default();
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind change feed");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles one text message, producing the message to send back.
async fn handle_text_message(
    text: &str,
    session: &mut TriageSession,
    state: &AppState,
) -> WsMessage {
    let Ok(envelope) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(String::new(), 1000, "malformed JSON envelope");
    };

    let command = match serde_json::from_value::<WsCommand>(envelope.payload.clone()) {
        Ok(command) => command,
        Err(_) => {
            return WsMessage::error(envelope.id, 1000, "unknown or malformed command");
        }
    };

    let result = match command {
        WsCommand::ApplyFilters {
            categories,
            q,
            date_bucket,
            near,
            lat,
            lon,
            radius_miles,
        } => {
            let request = CriteriaRequest {
                categories,
                search_text: q,
                date_bucket,
                near,
                lat,
                lon,
                radius_miles,
            };
            session.apply_filters(state, request).await
        }
        WsCommand::Accept => session.accept(state).await,
        WsCommand::Reject => session.reject(),
        WsCommand::Current => session.current(),
    };

    match result {
        Ok(payload) => WsMessage::response(envelope.id, payload),
        Err(error) => WsMessage::error(envelope.id, error.error_code(), &error.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn gesture_envelope_parses_into_a_command() {
        let envelope = WsMessage {
            id: "cmd-1".to_string(),
            msg_type: WsMessageType::Command,
            timestamp: Utc::now(),
            payload: serde_json::json!({ "command": "reject" }),
        };
        let json = serde_json::to_string(&envelope).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        let back: Option<WsMessage> = serde_json::from_str(&json).ok();
        let Some(back) = back else {
            panic!("round trip failed");
        };
        let command: Option<WsCommand> = serde_json::from_value(back.payload).ok();
        assert!(matches!(command, Some(WsCommand::Reject)));
    }
}
