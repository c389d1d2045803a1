/// Chat Server Actor
///
/// Owns the per-room broadcast groups. Its mailbox is the only writer of the
/// group map, so join, leave and broadcast never race, and broadcasts reach
/// each member in the order they were sent to the server.
use actix::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;

use super::events::*;

#[derive(Default)]
pub struct ChatServer {
    /// room_id -> session_id -> connection
    rooms: HashMap<i64, HashMap<Uuid, Recipient<super::message::ServerMessage>>>,
}

impl ChatServer {
    pub fn new() -> Self {
        Self { rooms: HashMap::new() }
    }
}

impl Actor for ChatServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Chat server started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Chat server stopped");
    }
}

impl Handler<Join> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: Join, _: &mut Context<Self>) {
        let members = self.rooms.entry(msg.room_id).or_default();
        members.insert(msg.session_id, msg.addr);

        tracing::debug!(
            "Session {} joined room {} ({} connections)",
            msg.session_id,
            msg.room_id,
            members.len()
        );
    }
}

impl Handler<Leave> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: Leave, _: &mut Context<Self>) {
        let Some(members) = self.rooms.get_mut(&msg.room_id) else {
            return;
        };

        if members.remove(&msg.session_id).is_some() {
            tracing::debug!(
                "Session {} left room {} ({} remaining)",
                msg.session_id,
                msg.room_id,
                members.len()
            );
        }

        if members.is_empty() {
            self.rooms.remove(&msg.room_id);
        }
    }
}

impl Handler<BroadcastToRoom> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: BroadcastToRoom, _: &mut Context<Self>) {
        let Some(members) = self.rooms.get(&msg.room_id) else {
            tracing::debug!("No live connections in room {}, broadcast dropped", msg.room_id);
            return;
        };

        for addr in members.values() {
            addr.do_send(msg.message.clone());
        }

        tracing::debug!("Broadcast to room {}: {} connections", msg.room_id, members.len());
    }
}

#[cfg(test)]
impl Handler<RoomSize> for ChatServer {
    type Result = usize;

    fn handle(&mut self, msg: RoomSize, _: &mut Context<Self>) -> Self::Result {
        self.rooms.get(&msg.room_id).map_or(0, HashMap::len)
    }
}
