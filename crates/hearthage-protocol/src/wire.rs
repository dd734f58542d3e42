//! JSON wire envelopes exchanged over the WebSocket transport.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{GameEvent, Proposal, World};

#[derive(Debug, Error)]
pub enum WireError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client-to-server messages.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Submit a proposal (structured action or free-text intent).
    Proposal { proposal: Proposal },
}

/// Server-to-client messages.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full state for a newly attached observer: the current world plus a
    /// bounded tail of recent events, enough to reconstruct state without
    /// replaying history.
    Snapshot {
        world: World,
        events: Vec<GameEvent>,
    },
    /// Broadcast after each successful step.
    Events {
        events: Vec<GameEvent>,
        world: World,
    },
    /// Sent to the originating connection only; never broadcast.
    Error { message: String },
}

pub fn serialize_client_message(msg: &ClientMessage) -> Result<String, WireError> {
    Ok(serde_json::to_string(msg)?)
}

pub fn deserialize_client_message(json: &str) -> Result<ClientMessage, WireError> {
    Ok(serde_json::from_str(json)?)
}

pub fn serialize_server_message(msg: &ServerMessage) -> Result<String, WireError> {
    Ok(serde_json::to_string(msg)?)
}

pub fn deserialize_server_message(json: &str) -> Result<ServerMessage, WireError> {
    Ok(serde_json::from_str(json)?)
}
