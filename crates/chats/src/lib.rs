//! # Parley Chats Crate
//!
//! Request handling for direct-message chats: validation, orchestration of
//! the identity, message, and chat stores, hydration of stored chats into
//! client documents, and the realtime events emitted on mutation.
//!
//! ## Architecture
//!
//! - **Services**: [`ChatService`] (request handler) and [`ChatProjector`]
//! - **Types**: requests, hydrated responses, events, and [`ChatError`]
//! - **Utils**: input validation
//!
//! The realtime transport is injected through the [`ChatNotifier`] trait.

pub mod services;
pub mod types;
pub mod utils;

pub use services::{ChatNotifier, ChatProjector, ChatService};
pub use types::{
    AddMessageRequest, AddParticipantRequest, ChatError, ChatEvent, ChatEventKind, ChatResult,
    CreateChatRequest, ErrorKind, HydratedChat, HydratedMessage, NewMessage, Participant,
    Timestamp,
};
