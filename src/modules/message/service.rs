/// Message Store
///
/// Append-only, room-scoped log. Appends to one room run under that room's
/// lock, and the broadcast is handed to the chat server before the lock is
/// released, so live subscribers see messages in append order.
use actix::Addr;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    api::error,
    modules::{
        matching::repository::MatchRepository,
        message::{
            model::{normalize_body, InsertMessage, MessagePage, MessageResponse, PageQuery},
            repository::MessageRepository,
        },
        room::{repository::RoomRepository, schema::ChatRoomEntity, service::RoomService},
        user::{model::UserProfile, repository::UserRepository},
        websocket::{events::BroadcastToRoom, message::ServerMessage, server::ChatServer},
    },
    utils::KeyedLocks,
};

#[derive(Clone)]
pub struct MessageService<M, R, U, X>
where
    M: MessageRepository + Send + Sync,
    R: RoomRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    X: MatchRepository + Send + Sync,
{
    message_repo: Arc<M>,
    match_repo: Arc<X>,
    user_repo: Arc<U>,
    rooms: RoomService<R, U>,
    chat_server: Addr<ChatServer>,
    room_locks: KeyedLocks<i64>,
    allow_post_after_unmatch: bool,
}

impl<M, R, U, X> MessageService<M, R, U, X>
where
    M: MessageRepository + Send + Sync,
    R: RoomRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    X: MatchRepository + Send + Sync,
{
    pub fn with_dependencies(
        message_repo: Arc<M>,
        match_repo: Arc<X>,
        user_repo: Arc<U>,
        rooms: RoomService<R, U>,
        chat_server: Addr<ChatServer>,
        allow_post_after_unmatch: bool,
    ) -> Self {
        MessageService {
            message_repo,
            match_repo,
            user_repo,
            rooms,
            chat_server,
            room_locks: KeyedLocks::new(),
            allow_post_after_unmatch,
        }
    }

    pub fn rooms(&self) -> &RoomService<R, U> {
        &self.rooms
    }

    pub async fn sender_profile(
        &self,
        user_id: i64,
    ) -> Result<Option<UserProfile>, error::SystemError> {
        Ok(self.user_repo.find_by_id(user_id).await?.map(UserProfile::from))
    }

    /// Persists a message from a participant and broadcasts it to the room.
    pub async fn append(
        &self,
        room_id: i64,
        sender_id: i64,
        body: &str,
    ) -> Result<MessageResponse, error::SystemError> {
        let room = self.rooms.authorize_participant(room_id, sender_id).await?;
        self.ensure_accepts_posts(&room).await?;
        let body = normalize_body(body).map_err(error::SystemError::bad_request)?;

        let sender = self.sender_profile(sender_id).await?;
        let username = sender
            .as_ref()
            .map(|s| s.display_name.clone())
            .unwrap_or_else(|| format!("user {sender_id}"));

        let _guard = self.room_locks.lock(room_id).await;

        let message = self
            .message_repo
            .create(&InsertMessage { room_id, sender_id, body: body.to_string() })
            .await?;

        self.chat_server.do_send(BroadcastToRoom {
            room_id,
            message: ServerMessage::chat(&message, username),
        });

        log::debug!("Message {} appended to room {} by {}", message.id, room_id, sender_id);

        Ok(MessageResponse::with_sender(message, sender))
    }

    async fn ensure_accepts_posts(&self, room: &ChatRoomEntity) -> Result<(), error::SystemError> {
        if self.allow_post_after_unmatch {
            return Ok(());
        }

        let active = self
            .match_repo
            .find_by_pair(&room.pair())
            .await?
            .is_some_and(|m| m.is_active);

        if !active {
            return Err(error::SystemError::forbidden("Room is inactive"));
        }
        Ok(())
    }

    /// One page of the room's history, oldest first. Everything the other
    /// participant sent is marked read before the page is loaded.
    pub async fn list_messages(
        &self,
        room_id: i64,
        requester_id: i64,
        query: PageQuery,
    ) -> Result<MessagePage, error::SystemError> {
        let room = self.rooms.authorize_participant(room_id, requester_id).await?;

        let marked = self.message_repo.mark_read(room_id, requester_id).await?;
        if marked > 0 {
            log::debug!("Marked {} messages read in room {} for {}", marked, room_id, requester_id);
        }

        let count = self.message_repo.count_in_room(room_id).await?;
        let messages = self
            .message_repo
            .find_page(room_id, query.page_size() as i64, query.offset())
            .await?;

        let profiles: HashMap<i64, UserProfile> = self
            .user_repo
            .find_many(&[room.user_a, room.user_b])
            .await?
            .into_iter()
            .map(|u| (u.id, UserProfile::from(u)))
            .collect();

        let results = messages
            .into_iter()
            .map(|m| {
                let sender = profiles.get(&m.sender_id).cloned();
                MessageResponse::with_sender(m, sender)
            })
            .collect();

        Ok(MessagePage { count, page: query.page(), page_size: query.page_size(), results })
    }

    pub async fn unread_count_for(
        &self,
        room_id: i64,
        user_id: i64,
    ) -> Result<i64, error::SystemError> {
        self.rooms.authorize_participant(room_id, user_id).await?;
        self.message_repo.count_unread(room_id, user_id).await
    }
}
