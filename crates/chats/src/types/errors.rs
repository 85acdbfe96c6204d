//! Error types for the chat system.

use parley_database::DatabaseError;
use thiserror::Error;

/// Result type alias for chat operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Coarse classification used at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Persistence,
}

/// Main error type for the chat system
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{message}")]
    Validation { message: String },

    #[error("Chat not found: {id}")]
    ChatNotFound { id: String },

    #[error("User not found: {username}")]
    UserNotFound { username: String },

    #[error("Failed to resolve participants: expected {expected}, resolved {resolved}")]
    ResolutionMismatch { expected: usize, resolved: usize },

    #[error("Persistence error: {message}")]
    Persistence { message: String },
}

impl ChatError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error for chats
    pub fn chat_not_found(id: impl Into<String>) -> Self {
        Self::ChatNotFound { id: id.into() }
    }

    pub fn user_not_found(username: impl Into<String>) -> Self {
        Self::UserNotFound {
            username: username.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::ChatNotFound { .. } | Self::UserNotFound { .. } => ErrorKind::NotFound,
            Self::ResolutionMismatch { .. } | Self::Persistence { .. } => ErrorKind::Persistence,
        }
    }
}

impl From<DatabaseError> for ChatError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ChatNotFound(id) => Self::ChatNotFound { id },
            DatabaseError::UserNotFound(username) => Self::UserNotFound { username },
            DatabaseError::ResolutionMismatch { expected, resolved } => {
                Self::ResolutionMismatch { expected, resolved }
            }
            other => Self::Persistence {
                message: other.to_string(),
            },
        }
    }
}
