//! WebSocket transport.
//!
//! Clients connect to `GET /ws`, receive one snapshot frame, then a
//! stream of event broadcasts. Inbound frames carry proposals; a frame
//! that fails to parse or validate answers that connection with an error
//! frame and disturbs nobody else. Clients that fall behind the broadcast
//! channel skip ahead to the most recent frame.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tracing::{debug, warn};

use hearthage_protocol::{
    deserialize_client_message, serialize_server_message, ClientMessage, ServerMessage,
};

use crate::intent::{resolve_intent, ExternalPlanner};
use crate::session::SessionHandle;

pub struct AppState {
    pub session: SessionHandle,
    pub planner: Option<Arc<ExternalPlanner>>,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new().route("/ws", get(ws_upgrade)).with_state(state)
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("client connected");

    let Some((world, events)) = state.session.snapshot().await else {
        return;
    };
    if !send(&mut socket, &ServerMessage::Snapshot { world, events }).await {
        return;
    }

    let mut rx = state.session.subscribe();
    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(message) => {
                        if !send(&mut socket, &message).await {
                            debug!("client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        debug!(skipped = n, "client lagged, skipping ahead");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!("session closed, shutting down connection");
                        return;
                    }
                }
            }
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(error) = handle_frame(&state, text.as_str()).await {
                            if !send(&mut socket, &ServerMessage::Error { message: error }).await {
                                return;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("client disconnected");
                        return;
                    }
                    Some(Err(e)) => {
                        debug!("websocket error: {e}");
                        return;
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Process one inbound text frame. Returns the error message owed to the
/// sender, if any.
async fn handle_frame(state: &AppState, text: &str) -> Option<String> {
    let message = match deserialize_client_message(text) {
        Ok(message) => message,
        Err(e) => return Some(e.to_string()),
    };
    let ClientMessage::Proposal { proposal } = message;

    // Plan against the world as of now; the session revalidates on apply.
    let Some((world, _)) = state.session.snapshot().await else {
        return Some("session closed".to_string());
    };
    let resolved = resolve_intent(state.planner.as_deref(), &world, proposal).await;

    state.session.propose(resolved).await.err()
}

async fn send(socket: &mut WebSocket, message: &ServerMessage) -> bool {
    let json = match serialize_server_message(message) {
        Ok(json) => json,
        Err(e) => {
            warn!("failed to serialize frame: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_state() -> AppState {
        AppState {
            session: SessionHandle::closed(),
            planner: None,
        }
    }

    #[tokio::test]
    async fn frames_against_a_closed_session_get_an_error() {
        let frame =
            r#"{"type":"proposal","proposal":{"player_id":"p1","action":{"type":"migrate"}}}"#;
        let error = handle_frame(&closed_state(), frame).await;
        assert_eq!(error, Some("session closed".to_string()));
    }

    #[tokio::test]
    async fn malformed_frames_get_a_parse_error() {
        let error = handle_frame(&closed_state(), "not json").await;
        assert!(error.is_some_and(|e| e.contains("json error")));
    }
}
