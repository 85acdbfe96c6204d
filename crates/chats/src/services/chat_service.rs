//! Chat service: validates requests and orchestrates the stores.

use std::sync::Arc;

use chrono::SecondsFormat;
use parley_database::{
    ChatRepository, CreateChatRequest as StoreChatRequest, CreateMessageRequest,
    MessageRepository, UserRepository,
};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::notifier::ChatNotifier;
use super::projection::ChatProjector;
use crate::types::{
    AddMessageRequest, AddParticipantRequest, ChatError, ChatEvent, ChatResult,
    CreateChatRequest, HydratedChat, NewMessage,
};
use crate::utils::Validator;

/// Service for managing chat operations
#[derive(Clone)]
pub struct ChatService {
    chats: ChatRepository,
    messages: MessageRepository,
    users: UserRepository,
    projector: ChatProjector,
    notifier: Arc<dyn ChatNotifier>,
}

impl ChatService {
    pub fn new(pool: SqlitePool, notifier: Arc<dyn ChatNotifier>) -> Self {
        Self {
            chats: ChatRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            projector: ChatProjector::new(pool),
            notifier,
        }
    }

    /// Create a chat with optional seed messages and announce it to every
    /// connection.
    ///
    /// Seed messages are stored one by one before the chat itself; if a later
    /// step fails the earlier messages stay behind unreferenced.
    pub async fn create_chat(&self, request: CreateChatRequest) -> ChatResult<HydratedChat> {
        request.validate().map_err(ChatError::validation)?;

        let participants = self.users.resolve_usernames(&request.participants).await?;

        let mut message_ids = Vec::with_capacity(request.seed_messages().len());
        for seed in request.seed_messages() {
            let message = self.store_message(seed).await.map_err(|err| match err {
                ChatError::UserNotFound { username } => ChatError::persistence(format!(
                    "seed message sender {username} does not exist"
                )),
                other => other,
            })?;
            message_ids.push(message);
        }

        let chat = self
            .chats
            .create(&StoreChatRequest {
                participant_ids: participants.iter().map(|user| user.id).collect(),
                message_ids,
            })
            .await?;

        let hydrated = self.projector.hydrate(&chat).await?;
        self.notifier
            .broadcast_to_all(&ChatEvent::created(hydrated.clone()))
            .await;

        info!(
            chat_id = %hydrated.id,
            participants = hydrated.participants.len(),
            messages = hydrated.messages.len(),
            "chat created"
        );
        Ok(hydrated)
    }

    /// Append a message and push the updated chat to the chat's channel.
    pub async fn add_message(
        &self,
        chat_id: &str,
        request: AddMessageRequest,
    ) -> ChatResult<HydratedChat> {
        Validator::chat_id(chat_id).map_err(ChatError::validation)?;
        request.validate().map_err(ChatError::validation)?;

        // checked first so a missing chat never leaves an orphan message
        if self.chats.find_by_public_id(chat_id).await?.is_none() {
            return Err(ChatError::chat_not_found(chat_id));
        }

        let message_id = self.store_message(&request).await?;
        self.chats.append_message(chat_id, message_id).await?;

        let hydrated = self.projector.hydrate_by_id(chat_id).await?;
        self.notifier
            .broadcast_to_channel(chat_id, &ChatEvent::new_message(hydrated.clone()))
            .await;

        info!(chat_id, message_id, sender = %request.msg_from, "message added");
        Ok(hydrated)
    }

    pub async fn get_chat(&self, chat_id: &str) -> ChatResult<HydratedChat> {
        Validator::chat_id(chat_id).map_err(ChatError::validation)?;
        self.projector.hydrate_by_id(chat_id).await
    }

    /// Every chat the user takes part in. An unknown username has no chats.
    ///
    /// Fails as a whole if any single chat cannot be hydrated.
    pub async fn list_chats_for_user(&self, username: &str) -> ChatResult<Vec<HydratedChat>> {
        Validator::username("username", username).map_err(ChatError::validation)?;

        let Some(user) = self.users.find_by_username(username).await? else {
            debug!(username, "no identity for username, returning no chats");
            return Ok(Vec::new());
        };

        let chats = self.chats.find_containing_all(&[user.id]).await?;

        let mut hydrated = Vec::with_capacity(chats.len());
        for chat in &chats {
            let view = self.projector.hydrate(chat).await.map_err(|err| {
                warn!(chat_id = %chat.public_id, error = %err, "failed to hydrate chat in listing");
                ChatError::persistence(format!("failed to load chat {}: {err}", chat.public_id))
            })?;
            hydrated.push(view);
        }

        debug!(username, count = hydrated.len(), "listed chats");
        Ok(hydrated)
    }

    /// Add a participant. Re-adding an existing participant is a no-op.
    /// No realtime event is sent.
    pub async fn add_participant(
        &self,
        chat_id: &str,
        request: AddParticipantRequest,
    ) -> ChatResult<HydratedChat> {
        Validator::chat_id(chat_id).map_err(ChatError::validation)?;
        request.validate().map_err(ChatError::validation)?;

        let user = self
            .users
            .find_by_username(&request.participant)
            .await?
            .ok_or_else(|| ChatError::user_not_found(&request.participant))?;

        self.chats.add_participant(chat_id, user.id).await?;

        info!(chat_id, participant = %request.participant, "participant added");
        self.projector.hydrate_by_id(chat_id).await
    }

    async fn store_message(&self, message: &NewMessage) -> ChatResult<i64> {
        let sent_at = message.sent_at().map_err(ChatError::validation)?;

        let stored = self
            .messages
            .create(&CreateMessageRequest {
                content: message.msg.clone(),
                sender_username: message.msg_from.clone(),
                sent_at: sent_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            })
            .await?;

        Ok(stored.id)
    }
}
