//! Repository for chat data access operations.

use crate::entities::{Chat, CreateChatRequest};
use crate::timestamp_now;
use crate::types::{DatabaseError, DatabaseResult};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

/// Repository for chat database operations
#[derive(Clone)]
pub struct ChatRepository {
    pool: SqlitePool,
}

impl ChatRepository {
    /// Create a new chat repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find chat by public ID
    pub async fn find_by_public_id(&self, public_id: &str) -> DatabaseResult<Option<Chat>> {
        let row = sqlx::query("SELECT id, public_id, created_at, updated_at FROM chats WHERE public_id = ?")
            .bind(public_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: i64 = row.try_get("id")?;
        let (participant_ids, message_ids) = self.load_references(id).await?;

        Ok(Some(Chat {
            id,
            public_id: row.try_get("public_id")?,
            participant_ids,
            message_ids,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }

    /// Chats whose participants include every one of `user_ids`.
    pub async fn find_containing_all(&self, user_ids: &[i64]) -> DatabaseResult<Vec<Chat>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT chat_id FROM chat_participants WHERE user_id IN (");
        let mut separated = builder.separated(", ");
        for id in user_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") GROUP BY chat_id HAVING COUNT(DISTINCT user_id) = ");
        builder.push_bind(user_ids.len() as i64);
        builder.push(" ORDER BY chat_id ASC");

        let chat_ids: Vec<i64> = builder
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await?;

        let mut chats = Vec::with_capacity(chat_ids.len());
        for chat_id in chat_ids {
            if let Some(chat) = self.find_by_id(chat_id).await? {
                chats.push(chat);
            }
        }

        debug!(count = chats.len(), "loaded chats by participants");
        Ok(chats)
    }

    /// Create a chat from already-resolved participants and messages.
    pub async fn create(&self, request: &CreateChatRequest) -> DatabaseResult<Chat> {
        let public_id = Uuid::new_v4().to_string();
        let now = timestamp_now();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("INSERT INTO chats (public_id, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(&public_id)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        let chat_id = result.last_insert_rowid();

        let mut participant_ids = Vec::with_capacity(request.participant_ids.len());
        for user_id in &request.participant_ids {
            let inserted = sqlx::query(
                "INSERT OR IGNORE INTO chat_participants (chat_id, user_id, position, joined_at) VALUES (?, ?, ?, ?)",
            )
            .bind(chat_id)
            .bind(*user_id)
            .bind(participant_ids.len() as i64)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
            if inserted.rows_affected() > 0 {
                participant_ids.push(*user_id);
            }
        }

        for (position, message_id) in request.message_ids.iter().enumerate() {
            sqlx::query("INSERT INTO chat_messages (chat_id, message_id, position) VALUES (?, ?, ?)")
                .bind(chat_id)
                .bind(*message_id)
                .bind(position as i64)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(
            chat_id,
            public_id = %public_id,
            participants = participant_ids.len(),
            messages = request.message_ids.len(),
            "created new chat"
        );

        Ok(Chat {
            id: chat_id,
            public_id,
            participant_ids,
            message_ids: request.message_ids.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Append a message to the end of a chat and touch `updated_at`.
    ///
    /// The insert is the first statement of the transaction so the write lock
    /// is taken before anything is read; concurrent appends queue on the busy
    /// timeout instead of failing on a read-to-write upgrade.
    pub async fn append_message(&self, public_id: &str, message_id: i64) -> DatabaseResult<()> {
        let now = timestamp_now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO chat_messages (chat_id, message_id, position)
             SELECT c.id, ?, COALESCE((SELECT MAX(cm.position) + 1 FROM chat_messages cm WHERE cm.chat_id = c.id), 0)
             FROM chats c WHERE c.public_id = ?",
        )
        .bind(message_id)
        .bind(public_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::ChatNotFound(public_id.to_string()));
        }

        sqlx::query("UPDATE chats SET updated_at = ? WHERE public_id = ?")
            .bind(&now)
            .bind(public_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(chat_id = %public_id, message_id, "appended message to chat");
        Ok(())
    }

    /// Add a participant. Adding an existing participant changes nothing.
    pub async fn add_participant(&self, public_id: &str, user_id: i64) -> DatabaseResult<()> {
        let now = timestamp_now();
        let mut tx = self.pool.begin().await?;

        // write first, as in append_message
        let result = sqlx::query(
            "INSERT OR IGNORE INTO chat_participants (chat_id, user_id, position, joined_at)
             SELECT c.id, ?, COALESCE((SELECT MAX(cp.position) + 1 FROM chat_participants cp WHERE cp.chat_id = c.id), 0), ?
             FROM chats c WHERE c.public_id = ?",
        )
        .bind(user_id)
        .bind(&now)
        .bind(public_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() > 0 {
            sqlx::query("UPDATE chats SET updated_at = ? WHERE public_id = ?")
                .bind(&now)
                .bind(public_id)
                .execute(&mut *tx)
                .await?;
            info!(chat_id = %public_id, user_id, "added participant to chat");
        } else {
            let exists: Option<i64> =
                sqlx::query_scalar("SELECT id FROM chats WHERE public_id = ?")
                    .bind(public_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if exists.is_none() {
                return Err(DatabaseError::ChatNotFound(public_id.to_string()));
            }
            debug!(chat_id = %public_id, user_id, "participant already present");
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Chat>> {
        let row = sqlx::query("SELECT public_id, created_at, updated_at FROM chats WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let (participant_ids, message_ids) = self.load_references(id).await?;

        Ok(Some(Chat {
            id,
            public_id: row.try_get("public_id")?,
            participant_ids,
            message_ids,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }

    async fn load_references(&self, chat_id: i64) -> DatabaseResult<(Vec<i64>, Vec<i64>)> {
        let participant_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT user_id FROM chat_participants WHERE chat_id = ? ORDER BY position ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        let message_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT message_id FROM chat_messages WHERE chat_id = ? ORDER BY position ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        Ok((participant_ids, message_ids))
    }
}
