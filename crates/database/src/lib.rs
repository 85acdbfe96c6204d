//! Parley Database Crate
//!
//! Connection management, migrations, and the repositories behind the chat
//! subsystem: identity resolution, the message store, and the chat store.

use chrono::{SecondsFormat, Utc};
use parley_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

pub use connection::prepare_database;
pub use migrations::run_migrations;

pub use repos::{ChatRepository, MessageRepository, UserRepository};

pub use entities::{
    chat::{Chat, CreateChatRequest},
    message::{ChatMessage, CreateMessageRequest, MessageType},
    user::{CreateUserRequest, User},
};

pub use types::{errors::DatabaseError, DatabaseResult};

pub use sqlx::SqlitePool as Pool;

/// Current time as stored in every timestamp column.
///
/// Fixed precision keeps the text columns ordered chronologically.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Connect and apply migrations.
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn initialize_database_creates_schema() {
        let temp_dir = TempDir::new().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}", temp_dir.path().join("nested/parley.db").display()),
            max_connections: 2,
        };

        let pool = initialize_database(&config).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        for expected in ["chat_messages", "chat_participants", "chats", "messages", "users"] {
            assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
        }
    }

    #[tokio::test]
    async fn foreign_keys_are_enabled() {
        let (pool, _dir) = test_utils::create_test_db().await;

        let result: (bool,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert!(result.0);
    }

    #[test]
    fn timestamps_sort_chronologically() {
        let earlier = timestamp_now();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let later = timestamp_now();

        assert_eq!(earlier.len(), later.len());
        assert!(earlier < later);
    }
}
