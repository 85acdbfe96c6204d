//! Error types for the database layer

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database query error: {0}")]
    QueryError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),

    #[error("Chat not found: {0}")]
    ChatNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Resolved {resolved} of {expected} usernames")]
    ResolutionMismatch { expected: usize, resolved: usize },

    #[error("Unknown message type stored: {0}")]
    InvalidMessageType(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        Self::QueryError(err.to_string())
    }
}
