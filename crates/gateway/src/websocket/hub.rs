//! In-process fan-out of chat events to websocket connections.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parley_chats::{ChatEvent, ChatNotifier};
use parley_config::RealtimeConfig;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

/// Frames pushed from the server to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    ChatUpdate(ChatEvent),
}

/// One global channel every connection listens on, plus one channel per chat
/// id that connections opt into with `joinChat`.
#[derive(Clone)]
pub struct RealtimeHub {
    global: broadcast::Sender<ServerEvent>,
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<ServerEvent>>>>,
    channel_capacity: usize,
    outbound_buffer: usize,
}

impl RealtimeHub {
    pub fn new(config: &RealtimeConfig) -> Self {
        let (global, _) = broadcast::channel(config.channel_capacity);
        Self {
            global,
            channels: Arc::new(RwLock::new(HashMap::new())),
            channel_capacity: config.channel_capacity,
            outbound_buffer: config.outbound_buffer,
        }
    }

    pub fn outbound_buffer(&self) -> usize {
        self.outbound_buffer
    }

    pub fn subscribe_all(&self) -> broadcast::Receiver<ServerEvent> {
        self.global.subscribe()
    }

    /// Subscribe to a chat's channel, creating it on first use.
    pub async fn join(&self, chat_id: &str) -> broadcast::Receiver<ServerEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(chat_id.to_string())
            .or_insert_with(|| broadcast::channel(self.channel_capacity).0)
            .subscribe()
    }

    /// Drop channels nobody listens to any more.
    pub async fn prune(&self) {
        let mut channels = self.channels.write().await;
        channels.retain(|_, sender| sender.receiver_count() > 0);
        debug!(remaining = channels.len(), "pruned idle chat channels");
    }

    /// Number of chat channels currently held open.
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }

    pub async fn subscriber_count(&self, chat_id: &str) -> usize {
        self.channels
            .read()
            .await
            .get(chat_id)
            .map_or(0, |sender| sender.receiver_count())
    }

    pub fn connection_count(&self) -> usize {
        self.global.receiver_count()
    }
}

#[async_trait]
impl ChatNotifier for RealtimeHub {
    async fn broadcast_to_channel(&self, chat_id: &str, event: &ChatEvent) {
        let sender = self.channels.read().await.get(chat_id).cloned();
        let delivered = sender
            .map(|sender| sender.send(ServerEvent::ChatUpdate(event.clone())).unwrap_or(0))
            .unwrap_or(0);
        debug!(chat_id, delivered, kind = ?event.kind, "broadcast to chat channel");
    }

    async fn broadcast_to_all(&self, event: &ChatEvent) {
        // send only fails when no connection is open
        let delivered = self
            .global
            .send(ServerEvent::ChatUpdate(event.clone()))
            .unwrap_or(0);
        debug!(chat_id = %event.chat_id(), delivered, kind = ?event.kind, "broadcast to all connections");
    }
}
