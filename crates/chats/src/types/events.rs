//! Event types for real-time chat updates.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::responses::HydratedChat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ChatEventKind {
    Created,
    NewMessage,
}

/// Payload of a `chatUpdate` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatEvent {
    pub chat: HydratedChat,
    #[serde(rename = "type")]
    pub kind: ChatEventKind,
}

impl ChatEvent {
    pub fn created(chat: HydratedChat) -> Self {
        Self {
            chat,
            kind: ChatEventKind::Created,
        }
    }

    pub fn new_message(chat: HydratedChat) -> Self {
        Self {
            chat,
            kind: ChatEventKind::NewMessage,
        }
    }

    /// Get the chat ID associated with this event
    pub fn chat_id(&self) -> &str {
        &self.chat.id
    }
}
