//! Shared types for the chat system.

pub mod errors;
pub mod events;
pub mod requests;
pub mod responses;

pub use errors::{ChatError, ChatResult, ErrorKind};
pub use events::{ChatEvent, ChatEventKind};
pub use requests::{AddMessageRequest, AddParticipantRequest, CreateChatRequest, NewMessage, Timestamp};
pub use responses::{HydratedChat, HydratedMessage, Participant};
