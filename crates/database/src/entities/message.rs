//! Message entity definitions

use serde::{Deserialize, Serialize};

use crate::types::DatabaseError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub public_id: String,
    pub sender_id: i64,
    pub content: String,
    pub message_type: MessageType,
    pub sent_at: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub content: String,
    pub sender_username: String,
    pub sent_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Direct,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Direct => "direct",
        }
    }
}

impl TryFrom<&str> for MessageType {
    type Error = DatabaseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "direct" => Ok(MessageType::Direct),
            other => Err(DatabaseError::InvalidMessageType(other.to_string())),
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_type_must_be_known() {
        assert_eq!(MessageType::try_from("direct").unwrap(), MessageType::Direct);
        assert!(matches!(
            MessageType::try_from("broadcast"),
            Err(DatabaseError::InvalidMessageType(value)) if value == "broadcast"
        ));
    }
}
