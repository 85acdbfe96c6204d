use std::sync::Arc;

use parley_chats::ChatService;
use parley_config::RealtimeConfig;
use sqlx::SqlitePool;

use crate::websocket::RealtimeHub;

#[derive(Clone)]
pub struct AppState {
    chat_service: ChatService,
    hub: RealtimeHub,
}

impl AppState {
    /// The hub is handed to the chat service as its notifier, so every
    /// mutation made through the service reaches websocket clients.
    pub fn new(pool: SqlitePool, realtime: &RealtimeConfig) -> Self {
        let hub = RealtimeHub::new(realtime);
        let chat_service = ChatService::new(pool, Arc::new(hub.clone()));
        Self { chat_service, hub }
    }

    pub fn chat_service(&self) -> &ChatService {
        &self.chat_service
    }

    pub fn hub(&self) -> &RealtimeHub {
        &self.hub
    }
}
