//! Domain entities for the database layer

pub mod chat;
pub mod message;
pub mod user;

pub use chat::{Chat, CreateChatRequest};
pub use message::{ChatMessage, CreateMessageRequest, MessageType};
pub use user::{CreateUserRequest, User};
