//! WebSocket upgrade handler and per-connection event loop.

use std::collections::HashSet;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tokio::sync::mpsc;

use crate::AppState;

use super::events::{ClientMessage, EventName, SendVotePayload, ServerMessage};
use super::fanout::VoteCast;

/// Close codes (4000-range for application-level).
const CLOSE_UNKNOWN_ERROR: u16 = 4000;
const CLOSE_UNKNOWN_EVENT: u16 = 4001;
const CLOSE_DIRECTORY_FULL: u16 = 4002;

pub fn router() -> Router<AppState> {
    Router::new().route("/gateway", get(ws_upgrade))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: AppState) {
    let (mut ws_tx, ws_rx) = socket.split();

    // Register with the directory before anything is sent, so the code the
    // client learns always resolves.
    let (direct_tx, direct_rx) = mpsc::unbounded_channel();
    let (conn_id, code) = match state.directory.register(direct_tx) {
        Ok(pair) => pair,
        Err(reason) => {
            tracing::warn!(%reason, "refusing gateway connection");
            let _ = send_close(&mut ws_tx, CLOSE_DIRECTORY_FULL, reason).await;
            return;
        }
    };

    tracing::info!(conn_id, code = %code, "gateway connection registered");

    // Tell the client its public identity.
    let json = serde_json::to_string(&ServerMessage::new_id(&code)).unwrap();
    if ws_tx.send(Message::Text(json.into())).await.is_err() {
        state.directory.unregister(conn_id);
        return;
    }

    let broadcast_rx = state.broadcast.subscribe();
    run_connection(&state, conn_id, ws_tx, ws_rx, direct_rx, broadcast_rx).await;

    // Free the code before the socket's resources go away, so it never
    // resolves to a dead connection.
    state.directory.unregister(conn_id);

    tracing::info!(conn_id, code = %code, "gateway connection closed");
}

/// Main connection loop: read client events, forward targeted messages and
/// vote broadcasts.
async fn run_connection(
    state: &AppState,
    conn_id: u64,
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut ws_rx: SplitStream<WebSocket>,
    mut direct_rx: mpsc::UnboundedReceiver<ServerMessage>,
    mut broadcast_rx: broadcast::Receiver<std::sync::Arc<VoteCast>>,
) {
    // Group channels this connection subscribed to. Owned by this task; no
    // shared state.
    let mut channels: HashSet<String> = HashSet::new();

    loop {
        tokio::select! {
            // Client sends us a message.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let client_msg: ClientMessage = match serde_json::from_str(&text) {
                            Ok(m) => m,
                            Err(_) => {
                                let _ = send_close(&mut ws_tx, CLOSE_UNKNOWN_ERROR, "Invalid JSON").await;
                                break;
                            }
                        };

                        match client_msg.event.as_str() {
                            EventName::SUBSCRIBE => {
                                match client_msg.data.as_str() {
                                    Some(group) => {
                                        channels.insert(group.to_string());
                                    }
                                    None => {
                                        let _ = send_close(&mut ws_tx, CLOSE_UNKNOWN_ERROR, "Expected a group id").await;
                                        break;
                                    }
                                }
                            }
                            EventName::ALLOW_VOTE => {
                                match client_msg.data.as_str() {
                                    Some(target) => {
                                        // The target may have legitimately
                                        // disconnected; a miss is not an error.
                                        if !state.directory.send_to(target, ServerMessage::vote_allowed()) {
                                            tracing::debug!(conn_id, code = target, "allow-vote target not registered");
                                        }
                                    }
                                    None => {
                                        let _ = send_close(&mut ws_tx, CLOSE_UNKNOWN_ERROR, "Expected a session code").await;
                                        break;
                                    }
                                }
                            }
                            EventName::SEND_VOTE => {
                                match serde_json::from_value::<SendVotePayload>(client_msg.data) {
                                    Ok(payload) => {
                                        state.broadcast.dispatch(VoteCast {
                                            group: payload.group,
                                            participant: payload.participant,
                                        });
                                    }
                                    Err(_) => {
                                        let _ = send_close(&mut ws_tx, CLOSE_UNKNOWN_ERROR, "Invalid send-vote payload").await;
                                        break;
                                    }
                                }
                            }
                            _ => {
                                let _ = send_close(&mut ws_tx, CLOSE_UNKNOWN_EVENT, "Unknown event").await;
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(?e, conn_id, "ws read error");
                        break;
                    }
                    _ => continue,
                }
            }

            // Targeted message routed through the directory (vote-allowed).
            Some(msg) = direct_rx.recv() => {
                let json = serde_json::to_string(&msg).unwrap();
                if ws_tx.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }

            // Cast vote from the fanout hub.
            result = broadcast_rx.recv() => {
                match result {
                    Ok(cast) => {
                        if !channels.contains(&cast.group) {
                            continue;
                        }

                        let msg = ServerMessage::vote_cast(&cast.group, &cast.participant);
                        let json = serde_json::to_string(&msg).unwrap();
                        if ws_tx.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(conn_id, skipped = n, "gateway connection lagged behind broadcast");
                        // Continue — we just drop the missed events.
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        }
    }
}

/// Send a WebSocket close frame with a code and reason.
async fn send_close(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    code: u16,
    reason: &str,
) -> Result<(), axum::Error> {
    let close_msg = Message::Close(Some(CloseFrame {
        code,
        reason: reason.to_string().into(),
    }));
    ws_tx.send(close_msg).await
}
