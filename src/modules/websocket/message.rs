/// Wire frames of the chat socket.
///
/// Inbound: `{"message": "..."}` only. Outbound: a `chat_message` broadcast
/// for every persisted message, or an `error` frame sent to a single
/// connection when its input was rejected.
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::modules::message::schema::MessageEntity;

#[derive(Debug, Clone, Deserialize)]
pub struct ClientFrame {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ChatMessage {
        message: String,
        user_id: i64,
        username: String,
        message_id: i64,
        /// RFC 3339 with microseconds
        created_at: String,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn chat(message: &MessageEntity, username: impl Into<String>) -> Self {
        ServerMessage::ChatMessage {
            message: message.body.clone(),
            user_id: message.sender_id,
            username: username.into(),
            message_id: message.id,
            created_at: message.created_at.to_rfc3339_opts(SecondsFormat::Micros, false),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error { message: message.into() }
    }
}

impl actix::Message for ServerMessage {
    type Result = ();
}
