use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    constants::{DEFAULT_PAGE_SIZE, MAX_MESSAGE_LENGTH, MAX_PAGE_SIZE},
    modules::{message::schema::MessageEntity, user::model::UserProfile},
};

#[derive(Debug, Clone)]
pub struct InsertMessage {
    pub room_id: i64,
    pub sender_id: i64,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageBody {
    #[validate(length(min = 1))]
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
pub struct PageQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() as i64 - 1) * self.page_size() as i64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub room_id: i64,
    pub sender_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<UserProfile>,
    pub message: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub is_read: bool,
}

impl MessageResponse {
    pub fn with_sender(message: MessageEntity, sender: Option<UserProfile>) -> Self {
        MessageResponse {
            id: message.id,
            room_id: message.room_id,
            sender_id: message.sender_id,
            sender,
            message: message.body,
            created_at: message.created_at,
            is_read: message.is_read,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagePage {
    pub count: i64,
    pub page: u32,
    pub page_size: u32,
    pub results: Vec<MessageResponse>,
}

/// Trims the body and enforces the length bounds shared by REST and websocket input.
pub fn normalize_body(body: &str) -> Result<&str, &'static str> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err("Message cannot be empty or whitespace only");
    }
    if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
        return Err("Message is too long");
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_body_trims() {
        assert_eq!(normalize_body("  hi there \n"), Ok("hi there"));
    }

    #[test]
    fn test_normalize_body_rejects_blank_and_oversized() {
        assert!(normalize_body(" \t\n").is_err());
        assert!(normalize_body("").is_err());
        let long = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(normalize_body(&long).is_err());
        let exact = "é".repeat(MAX_MESSAGE_LENGTH);
        assert!(normalize_body(&exact).is_ok());
    }

    #[test]
    fn test_send_body_leaves_length_to_normalize() {
        let padded = SendMessageBody { message: format!(" {} ", "x".repeat(MAX_MESSAGE_LENGTH)) };
        assert!(padded.validate().is_ok());
        assert!(normalize_body(&padded.message).is_ok());

        assert!(SendMessageBody { message: String::new() }.validate().is_err());
    }

    #[test]
    fn test_page_query_defaults_and_offset() {
        let query = PageQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(query.offset(), 0);

        let query = PageQuery { page: Some(3), page_size: Some(20) };
        assert_eq!(query.offset(), 40);
    }
}
