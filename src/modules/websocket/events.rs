/// Messages exchanged between `ChatSession` actors and the `ChatServer`.
use actix::prelude::*;
use uuid::Uuid;

use super::message::ServerMessage;

/// Adds a connection to a room's broadcast group.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Join {
    pub session_id: Uuid,
    pub room_id: i64,
    pub addr: Recipient<ServerMessage>,
}

/// Removes a connection from a room's broadcast group. Unknown ids are ignored.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Leave {
    pub session_id: Uuid,
    pub room_id: i64,
}

/// Delivers `message` to every connection currently in the room.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct BroadcastToRoom {
    pub room_id: i64,
    pub message: ServerMessage,
}

/// Number of live connections in a room.
#[cfg(test)]
#[derive(Message)]
#[rtype(result = "usize")]
pub struct RoomSize {
    pub room_id: i64,
}

/// Tells a session its transport is gone.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Close;
