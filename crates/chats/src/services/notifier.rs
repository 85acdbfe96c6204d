//! Seam between chat handling and the realtime transport.

use async_trait::async_trait;

use crate::types::ChatEvent;

/// Publishes chat events to connected clients.
///
/// Delivery is best effort: having no subscribers is not an error, so the
/// methods are infallible.
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    /// Deliver to connections that joined the chat's channel.
    async fn broadcast_to_channel(&self, chat_id: &str, event: &ChatEvent);

    /// Deliver to every connection.
    async fn broadcast_to_all(&self, event: &ChatEvent);
}
