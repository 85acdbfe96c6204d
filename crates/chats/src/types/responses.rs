//! Response types for the chat system.

use parley_database::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A participant or message sender with display attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
}

impl From<&User> for Participant {
    fn from(user: &User) -> Self {
        Self {
            id: user.public_id.clone(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HydratedMessage {
    pub id: String,
    pub msg: String,
    pub msg_from: Participant,
    pub timestamp: String,
    /// Always `direct` for messages written by this service.
    #[serde(rename = "type")]
    pub message_type: String,
}

/// A chat with every participant and message reference expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HydratedChat {
    pub id: String,
    pub participants: Vec<Participant>,
    pub messages: Vec<HydratedMessage>,
    pub created_at: String,
    pub updated_at: String,
}

impl HydratedChat {
    pub fn has_participant(&self, username: &str) -> bool {
        self.participants.iter().any(|p| p.username == username)
    }
}
