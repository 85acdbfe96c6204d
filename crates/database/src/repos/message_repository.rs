//! Repository for message data access operations.

use crate::entities::{ChatMessage, CreateMessageRequest, MessageType};
use crate::timestamp_now;
use crate::types::{DatabaseError, DatabaseResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

/// Repository for message database operations
#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a direct message.
    ///
    /// The sender is resolved inside the insert, so an unknown username
    /// writes nothing and yields [`DatabaseError::UserNotFound`].
    pub async fn create(&self, request: &CreateMessageRequest) -> DatabaseResult<ChatMessage> {
        let public_id = Uuid::new_v4().to_string();
        let now = timestamp_now();
        let message_type = MessageType::Direct;

        let result = sqlx::query(
            "INSERT INTO messages (public_id, sender_id, content, message_type, sent_at, created_at)
             SELECT ?, id, ?, ?, ?, ? FROM users WHERE username = ?",
        )
        .bind(&public_id)
        .bind(&request.content)
        .bind(message_type.as_str())
        .bind(&request.sent_at)
        .bind(&now)
        .bind(&request.sender_username)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::UserNotFound(request.sender_username.clone()));
        }

        let message_id = result.last_insert_rowid();
        let sender_id: i64 = sqlx::query_scalar("SELECT sender_id FROM messages WHERE id = ?")
            .bind(message_id)
            .fetch_one(&self.pool)
            .await?;

        info!(
            message_id,
            public_id = %public_id,
            sender = %request.sender_username,
            "created new message"
        );

        Ok(ChatMessage {
            id: message_id,
            public_id,
            sender_id,
            content: request.content.clone(),
            message_type,
            sent_at: request.sent_at.clone(),
            created_at: now,
        })
    }

    /// All messages appended to a chat, oldest first.
    pub async fn find_by_chat_id(&self, chat_id: i64) -> DatabaseResult<Vec<ChatMessage>> {
        let rows = sqlx::query(
            "SELECT m.id, m.public_id, m.sender_id, m.content, m.message_type, m.sent_at, m.created_at
             FROM chat_messages cm
             JOIN messages m ON m.id = cm.message_id
             WHERE cm.chat_id = ?
             ORDER BY cm.position ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        let messages = rows
            .iter()
            .map(message_from_row)
            .collect::<DatabaseResult<Vec<_>>>()?;

        debug!(chat_id, count = messages.len(), "loaded chat messages");
        Ok(messages)
    }
}

fn message_from_row(row: &SqliteRow) -> DatabaseResult<ChatMessage> {
    let message_type: String = row.try_get("message_type")?;

    Ok(ChatMessage {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        sender_id: row.try_get("sender_id")?,
        content: row.try_get("content")?,
        message_type: MessageType::try_from(message_type.as_str())?,
        sent_at: row.try_get("sent_at")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CreateChatRequest, CreateUserRequest};
    use crate::repos::{ChatRepository, UserRepository};
    use crate::test_utils::create_test_db;

    fn message(content: &str, sender: &str) -> CreateMessageRequest {
        CreateMessageRequest {
            content: content.to_string(),
            sender_username: sender.to_string(),
            sent_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn create_resolves_sender() {
        let (pool, _dir) = create_test_db().await;
        let alice = UserRepository::new(pool.clone())
            .create(&CreateUserRequest {
                username: "alice".to_string(),
                display_name: Some("Alice".to_string()),
            })
            .await
            .unwrap();

        let repo = MessageRepository::new(pool);
        let created = repo.create(&message("hi", "alice")).await.unwrap();

        assert_eq!(created.sender_id, alice.id);
        assert_eq!(created.content, "hi");
        assert_eq!(created.message_type, MessageType::Direct);
        assert!(Uuid::parse_str(&created.public_id).is_ok());
    }

    #[tokio::test]
    async fn create_with_unknown_sender_writes_nothing() {
        let (pool, _dir) = create_test_db().await;
        let repo = MessageRepository::new(pool.clone());

        let err = repo.create(&message("hi", "ghost")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UserNotFound(name) if name == "ghost"));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn unknown_stored_type_is_reported() {
        let (pool, _dir) = create_test_db().await;
        let alice = UserRepository::new(pool.clone())
            .create(&CreateUserRequest {
                username: "alice".to_string(),
                display_name: None,
            })
            .await
            .unwrap();

        let repo = MessageRepository::new(pool.clone());
        let created = repo.create(&message("hi", "alice")).await.unwrap();
        let chat = ChatRepository::new(pool.clone())
            .create(&CreateChatRequest {
                participant_ids: vec![alice.id],
                message_ids: vec![created.id],
            })
            .await
            .unwrap();

        sqlx::query("UPDATE messages SET message_type = 'broadcast' WHERE id = ?")
            .bind(created.id)
            .execute(&pool)
            .await
            .unwrap();

        let err = repo.find_by_chat_id(chat.id).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidMessageType(value) if value == "broadcast"));
    }
}
