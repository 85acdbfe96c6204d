//! Request types for the chat system.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::validation::Validator;

/// Body of `POST /chats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    /// Usernames of the participants, at least two.
    #[serde(default)]
    pub participants: Vec<String>,
    /// Seed messages, stored in the given order.
    #[serde(default)]
    pub messages: Option<Vec<NewMessage>>,
}

impl CreateChatRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.participants.len() < 2 {
            return Err("A chat needs at least two participants".to_string());
        }

        for participant in &self.participants {
            Validator::username("participants", participant)?;
        }

        for message in self.seed_messages() {
            message.validate()?;
        }

        Ok(())
    }

    pub fn seed_messages(&self) -> &[NewMessage] {
        self.messages.as_deref().unwrap_or_default()
    }
}

/// A message as submitted by a client, either as a seed message or as the
/// body of `POST /chats/:chatId/messages`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    #[serde(default)]
    pub msg: String,
    /// Username of the sender.
    #[serde(default)]
    pub msg_from: String,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

pub type AddMessageRequest = NewMessage;

impl NewMessage {
    pub fn validate(&self) -> Result<(), String> {
        Validator::message_content(&self.msg)?;
        Validator::username("msgFrom", &self.msg_from)?;
        if let Some(timestamp) = &self.timestamp {
            timestamp.to_utc()?;
        }
        Ok(())
    }

    /// The supplied timestamp, or now when none was given.
    pub fn sent_at(&self) -> Result<DateTime<Utc>, String> {
        match &self.timestamp {
            Some(timestamp) => timestamp.to_utc(),
            None => Ok(Utc::now()),
        }
    }
}

/// Body of `POST /chats/:chatId/participants`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AddParticipantRequest {
    /// Username of the participant to add.
    #[serde(default, alias = "participantId")]
    pub participant: String,
}

impl AddParticipantRequest {
    pub fn validate(&self) -> Result<(), String> {
        Validator::username("participant", &self.participant)
    }
}

/// A point in time as sent by clients: epoch milliseconds, RFC 3339, a
/// naive `YYYY-MM-DDTHH:MM:SS` (read as UTC), or a plain `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(i64),
    Text(String),
}

impl Timestamp {
    pub fn to_utc(&self) -> Result<DateTime<Utc>, String> {
        match self {
            Timestamp::Millis(millis) => DateTime::<Utc>::from_timestamp_millis(*millis)
                .ok_or_else(|| format!("timestamp {millis} is out of range")),
            Timestamp::Text(text) => parse_text_timestamp(text.trim())
                .ok_or_else(|| format!("timestamp '{text}' is not a valid date")),
        }
    }
}

fn parse_text_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
