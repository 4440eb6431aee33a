//! WebSocket handler for real-time change notifications
//!
//! Each connection gets a bounded outbound queue registered with the hub
//! and one task that shuttles queued events to the socket while watching
//! the peer for disconnect. The accept handshake is axum's; everything
//! after the upgrade lives here.

use super::handlers::ApiState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::debug;

use crate::realtime::CHANNEL_QUEUE;

/// WebSocket upgrade handler for `/ws/events`
pub async fn ws_events(ws: WebSocketUpgrade, State(state): State<ApiState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle an individual WebSocket connection
async fn handle_ws(socket: WebSocket, state: ApiState) {
    let (tx, mut rx) = mpsc::channel::<String>(CHANNEL_QUEUE);
    let channel_id = state.hub.register(tx).await;

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Ping interval (30s) to detect dead peers
    let mut ping_interval = interval(Duration::from_secs(30));
    // Skip the first immediate tick
    ping_interval.tick().await;

    debug!(channel = %channel_id, "notification client connected");

    loop {
        tokio::select! {
            // Forward queued change events to the client
            queued = rx.recv() => {
                match queued {
                    Some(message) => {
                        if ws_sender.send(Message::Text(message.into())).await.is_err() {
                            debug!(channel = %channel_id, "WebSocket send failed, client disconnected");
                            break;
                        }
                    }
                    // Hub shut down and dropped our sender
                    None => {
                        let _ = ws_sender.send(Message::Close(None)).await;
                        break;
                    }
                }
            }

            _ = ping_interval.tick() => {
                if ws_sender.send(Message::Ping(vec![].into())).await.is_err() {
                    debug!(channel = %channel_id, "ping failed, client disconnected");
                    break;
                }
            }

            // Watch the peer for Pong / Close
            msg = ws_receiver.next() => {
                match msg {
                    Some(Ok(Message::Pong(_))) => {
                        // Client is alive
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(channel = %channel_id, "WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(channel = %channel_id, "WebSocket error: {}", e);
                        break;
                    }
                    _ => {
                        // Ignore text/binary messages from clients
                    }
                }
            }
        }
    }

    // Safe even when the hub already pruned this channel after a failed
    // delivery, or close_all beat us to it.
    state.hub.deregister(channel_id).await;
    debug!(channel = %channel_id, "WebSocket connection closed");
}
