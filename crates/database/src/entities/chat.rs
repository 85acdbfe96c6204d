//! Chat entity definitions

use serde::{Deserialize, Serialize};

/// A chat as stored: participant and message references in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub public_id: String,
    pub participant_ids: Vec<i64>,
    pub message_ids: Vec<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for [`ChatRepository::create`](crate::ChatRepository::create).
/// Ids are expected to be resolved already.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateChatRequest {
    pub participant_ids: Vec<i64>,
    pub message_ids: Vec<i64>,
}
