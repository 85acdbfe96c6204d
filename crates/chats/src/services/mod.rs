//! Business logic layer for the chat system.

pub mod chat_service;
pub mod notifier;
pub mod projection;

pub use chat_service::ChatService;
pub use notifier::ChatNotifier;
pub use projection::ChatProjector;
