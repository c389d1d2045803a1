/// Chat Session Actor
///
/// One actor per accepted connection. It is created already subscribed,
/// joins the room's broadcast group on start and leaves it on stop. Outbound
/// frames go to the socket task through an unbounded channel.
use actix::prelude::*;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::api::error;

use super::connection::ConnectionState;
use super::events::{Close, Join, Leave};
use super::gateway::SharedBackend;
use super::message::{ClientFrame, ServerMessage};
use super::server::ChatServer;

pub struct ChatSession {
    pub id: Uuid,
    state: ConnectionState,
    server: Addr<ChatServer>,
    tx: mpsc::UnboundedSender<String>,
    backend: SharedBackend,
}

impl ChatSession {
    pub fn new(
        state: ConnectionState,
        server: Addr<ChatServer>,
        tx: mpsc::UnboundedSender<String>,
        backend: SharedBackend,
    ) -> Self {
        Self { id: Uuid::now_v7(), state, server, tx, backend }
    }

    fn send_to_client(&self, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => {
                if self.tx.send(json).is_err() {
                    tracing::debug!("Session {} outbound channel closed", self.id);
                }
            }
            Err(e) => tracing::error!("Cannot serialize frame (session {}): {}", self.id, e),
        }
    }
}

/// Text shown to the sender when its message was refused.
fn rejection_text(err: &error::SystemError) -> String {
    match err {
        error::SystemError::BadRequest(msg)
        | error::SystemError::Forbidden(msg)
        | error::SystemError::NotFound(msg) => msg.to_string(),
        _ => "Could not send message".to_string(),
    }
}

impl Actor for ChatSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let Some(subscription) = self.state.subscription() else {
            tracing::warn!("Session {} started without a subscription", self.id);
            ctx.stop();
            return;
        };

        self.server.do_send(Join {
            session_id: self.id,
            room_id: subscription.room_id,
            addr: ctx.address().recipient(),
        });

        tracing::info!(
            "User {} ({}) subscribed to room {} on session {}",
            subscription.user_id,
            subscription.display_name,
            subscription.room_id,
            self.id
        );
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(subscription) = self.state.close() {
            self.server.do_send(Leave { session_id: self.id, room_id: subscription.room_id });
            tracing::info!(
                "User {} left room {} (session {})",
                subscription.user_id,
                subscription.room_id,
                self.id
            );
        }
    }
}

impl Message for ClientFrame {
    type Result = ();
}

/// Inbound message: persist, the broadcast echo is the confirmation.
///
/// Frames from one connection are stored in arrival order: the mailbox is
/// held until the current post finishes.
impl Handler<ClientFrame> for ChatSession {
    type Result = ();

    fn handle(&mut self, frame: ClientFrame, ctx: &mut Context<Self>) {
        let Some(subscription) = self.state.subscription().cloned() else {
            return;
        };

        let backend = self.backend.clone();
        let tx = self.tx.clone();
        let session_id = self.id;

        ctx.wait(
            async move {
                match backend.post(&subscription, &frame.message).await {
                    Ok(message) => tracing::debug!(
                        "Message {} posted to room {} from session {}",
                        message.id,
                        subscription.room_id,
                        session_id
                    ),
                    Err(e) => {
                        tracing::warn!(
                            "Message rejected (session {}, room {}): {}",
                            session_id,
                            subscription.room_id,
                            e
                        );
                        if let Ok(json) = serde_json::to_string(&ServerMessage::error(rejection_text(&e)))
                        {
                            let _ = tx.send(json);
                        }
                    }
                }
            }
            .into_actor(self),
        );
    }
}

impl Handler<ServerMessage> for ChatSession {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, _ctx: &mut Context<Self>) {
        self.send_to_client(&msg);
    }
}

impl Handler<Close> for ChatSession {
    type Result = ();

    fn handle(&mut self, _: Close, ctx: &mut Context<Self>) {
        ctx.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::websocket::connection::Subscription;
    use crate::modules::websocket::events::RoomSize;
    use crate::modules::websocket::gateway::ChatBackend;
    use crate::modules::message::model::MessageResponse;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Accepts everything except the body "reject".
    struct EchoBackend;

    #[async_trait::async_trait]
    impl ChatBackend for EchoBackend {
        async fn authorize(
            &self,
            room_id: i64,
            user_id: i64,
        ) -> Result<Subscription, error::SystemError> {
            Ok(Subscription { room_id, user_id, display_name: "Ann Lee".into() })
        }

        async fn post(
            &self,
            subscription: &Subscription,
            body: &str,
        ) -> Result<MessageResponse, error::SystemError> {
            if body == "reject" {
                return Err(error::SystemError::bad_request("Message rejected"));
            }
            Ok(MessageResponse {
                id: 1,
                room_id: subscription.room_id,
                sender_id: subscription.user_id,
                sender: None,
                message: body.to_string(),
                created_at: chrono::Utc::now(),
                is_read: false,
            })
        }
    }

    /// Takes longer to store "first" than anything else.
    #[derive(Default)]
    struct UnevenBackend {
        stored: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl ChatBackend for UnevenBackend {
        async fn authorize(
            &self,
            room_id: i64,
            user_id: i64,
        ) -> Result<Subscription, error::SystemError> {
            EchoBackend.authorize(room_id, user_id).await
        }

        async fn post(
            &self,
            subscription: &Subscription,
            body: &str,
        ) -> Result<MessageResponse, error::SystemError> {
            let delay = if body == "first" { 50 } else { 1 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.stored.lock().unwrap().push(body.to_string());
            EchoBackend.post(subscription, body).await
        }
    }

    fn subscribed(room_id: i64, user_id: i64) -> ConnectionState {
        ConnectionState::Subscribed(Subscription {
            room_id,
            user_id,
            display_name: "Ann Lee".into(),
        })
    }

    async fn room_size(server: &Addr<ChatServer>, room_id: i64) -> usize {
        server.send(RoomSize { room_id }).await.unwrap()
    }

    async fn wait_for_size(server: &Addr<ChatServer>, room_id: i64, expected: usize) {
        for _ in 0..100 {
            if room_size(server, room_id).await == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("room {room_id} never reached {expected} connections");
    }

    #[actix_web::test]
    async fn test_session_joins_and_leaves_its_room() {
        let server = ChatServer::new().start();
        let (tx, _rx) = mpsc::unbounded_channel();
        let session =
            ChatSession::new(subscribed(7, 1), server.clone(), tx, Arc::new(EchoBackend)).start();

        wait_for_size(&server, 7, 1).await;

        session.do_send(Close);
        session.do_send(Close);
        wait_for_size(&server, 7, 0).await;
    }

    #[actix_web::test]
    async fn test_unsubscribed_session_never_joins() {
        let server = ChatServer::new().start();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut state = ConnectionState::connecting(7);
        state.begin_authorization(3).unwrap();
        state.close();

        let _session = ChatSession::new(state, server.clone(), tx, Arc::new(EchoBackend)).start();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(room_size(&server, 7).await, 0);
    }

    #[actix_web::test]
    async fn test_rejected_frame_errors_only_the_sender() {
        let server = ChatServer::new().start();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session =
            ChatSession::new(subscribed(7, 1), server.clone(), tx, Arc::new(EchoBackend)).start();

        session.do_send(ClientFrame { message: "reject".into() });

        let frame: ServerMessage = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(frame, ServerMessage::error("Message rejected"));
    }

    #[actix_web::test]
    async fn test_frames_are_stored_in_arrival_order() {
        let server = ChatServer::new().start();
        let (tx, _rx) = mpsc::unbounded_channel();
        let backend = Arc::new(UnevenBackend::default());
        let session =
            ChatSession::new(subscribed(7, 1), server.clone(), tx, backend.clone()).start();

        session.do_send(ClientFrame { message: "first".into() });
        session.do_send(ClientFrame { message: "second".into() });

        for _ in 0..100 {
            if backend.stored.lock().unwrap().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(*backend.stored.lock().unwrap(), vec!["first", "second"]);
    }

    #[actix_web::test]
    async fn test_server_frames_are_forwarded_as_json() {
        let server = ChatServer::new().start();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session =
            ChatSession::new(subscribed(7, 1), server.clone(), tx, Arc::new(EchoBackend)).start();

        session.do_send(ServerMessage::error("ping"));

        assert_eq!(rx.recv().await.unwrap(), r#"{"type":"error","message":"ping"}"#);
    }
}
