//! Validation utilities.

/// Validation utilities
pub struct Validator;

impl Validator {
    /// A chat identifier is a UUID string.
    pub fn chat_id(chat_id: &str) -> Result<(), String> {
        if chat_id.trim().is_empty() {
            return Err("Chat id cannot be empty".to_string());
        }

        uuid::Uuid::parse_str(chat_id)
            .map_err(|_| format!("'{chat_id}' is not a valid chat id"))?;

        Ok(())
    }

    pub fn username(field: &str, username: &str) -> Result<(), String> {
        if username.trim().is_empty() {
            return Err(format!("{field} must be a non-empty username"));
        }

        if username.len() > 255 {
            return Err(format!("{field} is too long (max 255 characters)"));
        }

        Ok(())
    }

    /// Validate message content
    pub fn message_content(content: &str) -> Result<(), String> {
        if content.trim().is_empty() {
            return Err("Message content cannot be empty".to_string());
        }

        if content.len() > 100_000 {
            return Err("Message content too long (max 100,000 characters)".to_string());
        }

        Ok(())
    }
}
