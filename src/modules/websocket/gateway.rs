/// Seam between socket sessions and the chat services.
use std::sync::Arc;

use crate::{
    api::error,
    modules::{
        matching::repository::MatchRepository,
        message::{model::MessageResponse, repository::MessageRepository, service::MessageService},
        room::repository::RoomRepository,
        user::repository::UserRepository,
        websocket::connection::{ConnectionState, Subscription},
    },
};

#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Re-derives access from the room's current state. No grant is cached.
    async fn authorize(
        &self,
        room_id: i64,
        user_id: i64,
    ) -> Result<Subscription, error::SystemError>;

    async fn post(
        &self,
        subscription: &Subscription,
        body: &str,
    ) -> Result<MessageResponse, error::SystemError>;
}

pub type SharedBackend = Arc<dyn ChatBackend>;

/// Drives a new connection through authorization. The result is either
/// `Subscribed` or `Closed`; a closed connection must be refused without
/// exchanging any frame.
pub async fn admit(backend: &dyn ChatBackend, room_id: i64, user_id: i64) -> ConnectionState {
    let mut state = ConnectionState::connecting(room_id);
    if let Err(e) = state.begin_authorization(user_id) {
        tracing::error!("Connection to room {} aborted: {}", room_id, e);
        state.close();
        return state;
    }

    match backend.authorize(room_id, user_id).await {
        Ok(subscription) => {
            if let Err(e) = state.subscribe(subscription) {
                tracing::error!("Connection to room {} aborted: {}", room_id, e);
                state.close();
            }
        }
        Err(e) => {
            tracing::info!("User {} refused on room {}: {}", user_id, room_id, e);
            state.close();
        }
    }

    state
}

#[async_trait::async_trait]
impl<M, R, U, X> ChatBackend for MessageService<M, R, U, X>
where
    M: MessageRepository + Send + Sync + 'static,
    R: RoomRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    X: MatchRepository + Send + Sync + 'static,
{
    async fn authorize(
        &self,
        room_id: i64,
        user_id: i64,
    ) -> Result<Subscription, error::SystemError> {
        self.rooms().authorize_participant(room_id, user_id).await?;

        let display_name = self
            .sender_profile(user_id)
            .await?
            .map(|p| p.display_name)
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        Ok(Subscription { room_id, user_id, display_name })
    }

    async fn post(
        &self,
        subscription: &Subscription,
        body: &str,
    ) -> Result<MessageResponse, error::SystemError> {
        self.append(subscription.room_id, subscription.user_id, body).await
    }
}
