//! Websocket endpoint: pushes `chatUpdate` frames and handles
//! `joinChat` / `leaveChat` requests.

pub mod hub;

pub use hub::{RealtimeHub, ServerEvent};

use std::collections::HashMap;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Frames accepted from clients. The payload stays untyped so that a
/// non-string chat id can be ignored instead of failing the frame.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
enum ClientEvent {
    JoinChat(Value),
    LeaveChat(Value),
}

#[utoipa::path(
    get,
    path = "/ws",
    tag = "Realtime",
    responses(
        (status = 101, description = "Switching protocols to websocket")
    )
)]
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let hub = state.hub().clone();
    let (mut ws_sender, mut receiver) = socket.split();

    let (out_tx, mut out_rx) = mpsc::channel::<ServerEvent>(hub.outbound_buffer());
    let sender_task = tokio::spawn(async move {
        while let Some(event) = out_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(error) => {
                    warn!(%error, "failed to encode websocket frame");
                    continue;
                }
            };
            if let Err(error) = ws_sender.send(Message::Text(json)).await {
                debug!(%error, "websocket send failed, closing writer");
                break;
            }
        }
    });

    let global = forward(hub.subscribe_all(), out_tx.clone());
    let mut joined: HashMap<String, JoinHandle<()>> = HashMap::new();
    info!(connections = hub.connection_count(), "websocket connected");

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                handle_client_frame(&text, &hub, &out_tx, &mut joined).await;
            }
            Ok(Message::Close(_)) => break,
            Err(error) => {
                warn!(%error, "websocket receive failed");
                break;
            }
            // ping/pong are answered by axum, binary frames are not part of the protocol
            _ => {}
        }
    }

    global.abort();
    for (_, task) in joined.drain() {
        stop(task).await;
    }
    sender_task.abort();
    hub.prune().await;
    info!("websocket disconnected");
}

async fn handle_client_frame(
    text: &str,
    hub: &RealtimeHub,
    out_tx: &mpsc::Sender<ServerEvent>,
    joined: &mut HashMap<String, JoinHandle<()>>,
) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(error) => {
            debug!(%error, "ignoring unrecognised client frame");
            return;
        }
    };

    match event {
        ClientEvent::JoinChat(Value::String(chat_id)) => {
            if joined.contains_key(&chat_id) {
                return;
            }
            let receiver = hub.join(&chat_id).await;
            joined.insert(chat_id.clone(), forward(receiver, out_tx.clone()));
            debug!(chat_id, "joined chat channel");
        }
        ClientEvent::LeaveChat(Value::String(chat_id)) => {
            if let Some(task) = joined.remove(&chat_id) {
                stop(task).await;
                hub.prune().await;
                debug!(chat_id, "left chat channel");
            }
        }
        ClientEvent::JoinChat(_) | ClientEvent::LeaveChat(_) => {
            debug!("ignoring join/leave with a non-string chat id");
        }
    }
}

/// Abort a forwarder and wait until it has dropped its receiver.
async fn stop(task: JoinHandle<()>) {
    task.abort();
    let _ = task.await;
}

/// Copy events from a broadcast receiver into the connection's outbound queue.
fn forward(
    mut receiver: broadcast::Receiver<ServerEvent>,
    out_tx: mpsc::Sender<ServerEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if out_tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket client lagging, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_config::RealtimeConfig;

    #[tokio::test]
    async fn non_string_chat_ids_are_ignored() {
        let hub = RealtimeHub::new(&RealtimeConfig::default());
        let (out_tx, _out_rx) = mpsc::channel(4);
        let mut joined = HashMap::new();

        for frame in [
            r#"{"event":"joinChat","data":42}"#,
            r#"{"event":"joinChat","data":{"id":"x"}}"#,
            r#"{"event":"joinChat"}"#,
            r#"{"event":"somethingElse","data":"x"}"#,
            "not json",
        ] {
            handle_client_frame(frame, &hub, &out_tx, &mut joined).await;
        }

        assert!(joined.is_empty());
    }

    #[tokio::test]
    async fn join_is_not_duplicated_and_leave_releases_the_channel() {
        let hub = RealtimeHub::new(&RealtimeConfig::default());
        let (out_tx, _out_rx) = mpsc::channel(4);
        let mut joined = HashMap::new();

        let join = r#"{"event":"joinChat","data":"chat-1"}"#;
        handle_client_frame(join, &hub, &out_tx, &mut joined).await;
        handle_client_frame(join, &hub, &out_tx, &mut joined).await;
        assert_eq!(hub.subscriber_count("chat-1").await, 1);

        handle_client_frame(r#"{"event":"leaveChat","data":"chat-1"}"#, &hub, &out_tx, &mut joined)
            .await;
        assert!(joined.is_empty());
        assert_eq!(hub.subscriber_count("chat-1").await, 0);
        assert_eq!(hub.channel_count().await, 0);
    }
}
