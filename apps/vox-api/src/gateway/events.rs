//! Gateway event names and wire-format messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event names carried on the wire.
pub struct EventName;

impl EventName {
    pub const NEW_ID: &'static str = "new-id";
    pub const SUBSCRIBE: &'static str = "subscribe";
    pub const ALLOW_VOTE: &'static str = "allow-vote";
    pub const VOTE_ALLOWED: &'static str = "vote-allowed";
    pub const SEND_VOTE: &'static str = "send-vote";
}

// ---------------------------------------------------------------------------
// Server → Client message
// ---------------------------------------------------------------------------

/// A message sent from the server to the client over WebSocket.
#[derive(Debug, Clone, Serialize)]
pub struct ServerMessage {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ServerMessage {
    /// Sent once on connect; data is the assigned session code.
    pub fn new_id(code: &str) -> Self {
        Self {
            event: EventName::NEW_ID.to_string(),
            data: Some(Value::String(code.to_string())),
        }
    }

    /// Sent to the single connection a vote was granted to.
    pub fn vote_allowed() -> Self {
        Self {
            event: EventName::VOTE_ALLOWED.to_string(),
            data: None,
        }
    }

    /// Fanned out to every subscriber of the group's vote channel.
    pub fn vote_cast(group: &str, participant: &str) -> Self {
        Self {
            event: format!("vote-{group}"),
            data: Some(serde_json::json!({ "participant": participant })),
        }
    }
}

// ---------------------------------------------------------------------------
// Client → Server message
// ---------------------------------------------------------------------------

/// A message received from the client over WebSocket.
#[derive(Debug, Deserialize)]
pub struct ClientMessage {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// Payload of a `send-vote` event.
#[derive(Debug, Deserialize)]
pub struct SendVotePayload {
    pub group: String,
    pub participant: String,
}
