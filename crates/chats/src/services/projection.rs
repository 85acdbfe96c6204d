//! Expands stored chat references into client-facing documents.

use std::collections::{BTreeSet, HashMap};

use parley_database::{Chat, ChatRepository, MessageRepository, User, UserRepository};
use sqlx::SqlitePool;
use tracing::{debug, error};

use crate::types::{ChatError, ChatResult, HydratedChat, HydratedMessage, Participant};

#[derive(Clone)]
pub struct ChatProjector {
    chats: ChatRepository,
    messages: MessageRepository,
    users: UserRepository,
}

impl ChatProjector {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            chats: ChatRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    /// Load a chat by public id and hydrate it.
    pub async fn hydrate_by_id(&self, chat_id: &str) -> ChatResult<HydratedChat> {
        let chat = self
            .chats
            .find_by_public_id(chat_id)
            .await?
            .ok_or_else(|| ChatError::chat_not_found(chat_id))?;

        self.hydrate(&chat).await
    }

    pub async fn hydrate(&self, chat: &Chat) -> ChatResult<HydratedChat> {
        let messages = self.messages.find_by_chat_id(chat.id).await?;

        let user_ids: BTreeSet<i64> = chat
            .participant_ids
            .iter()
            .copied()
            .chain(messages.iter().map(|m| m.sender_id))
            .collect();
        let user_ids: Vec<i64> = user_ids.into_iter().collect();
        let users: HashMap<i64, User> = self
            .users
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let lookup = |id: i64| -> ChatResult<Participant> {
            users.get(&id).map(Participant::from).ok_or_else(|| {
                error!(chat_id = %chat.public_id, user_id = id, "dangling user reference");
                ChatError::persistence(format!("chat {} references unknown user {id}", chat.public_id))
            })
        };

        let participants = chat
            .participant_ids
            .iter()
            .map(|id| lookup(*id))
            .collect::<ChatResult<Vec<_>>>()?;

        let messages = messages
            .into_iter()
            .map(|message| {
                Ok(HydratedMessage {
                    id: message.public_id,
                    msg: message.content,
                    msg_from: lookup(message.sender_id)?,
                    timestamp: message.sent_at,
                    message_type: message.message_type.to_string(),
                })
            })
            .collect::<ChatResult<Vec<_>>>()?;

        debug!(
            chat_id = %chat.public_id,
            participants = participants.len(),
            messages = messages.len(),
            "hydrated chat"
        );

        Ok(HydratedChat {
            id: chat.public_id.clone(),
            participants,
            messages,
            created_at: chat.created_at.clone(),
            updated_at: chat.updated_at.clone(),
        })
    }
}
