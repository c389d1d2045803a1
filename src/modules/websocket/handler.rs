/// Socket upgrade and frame pump.
///
/// Authorization runs before the upgrade, so a refused peer gets a bare 403
/// and never joins a broadcast group. After the upgrade:
/// - Inbound:  socket -> parse `ClientFrame` -> session actor
/// - Outbound: chat server -> session actor -> mpsc channel -> socket
use actix::{Actor, Addr};
use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use actix_ws::Message;
use tokio::sync::mpsc;

use super::events::Close;
use super::gateway::{admit, ChatBackend};
use super::message::{ClientFrame, ServerMessage};
use super::server::ChatServer;
use super::session::ChatSession;
use crate::middlewares::get_claims;

#[get("/chat/{room_id}/")]
pub async fn chat_socket(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<i64>,
    server: web::Data<Addr<ChatServer>>,
    backend: web::Data<dyn ChatBackend>,
) -> Result<HttpResponse, Error> {
    let room_id = path.into_inner();
    let user_id = get_claims(&req)?.sub;
    let backend = backend.into_inner();

    let state = admit(backend.as_ref(), room_id, user_id).await;
    if state.subscription().is_none() {
        return Ok(HttpResponse::Forbidden().finish());
    }

    let (response, mut ws_session, mut msg_stream) = actix_ws::handle(&req, stream)?;
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let addr = ChatSession::new(state, server.get_ref().clone(), tx, backend).start();

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                msg = msg_stream.recv() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<ClientFrame>(&text) {
                                Ok(frame) => addr.do_send(frame),
                                Err(e) => {
                                    tracing::debug!("Unreadable frame on room {}: {}", room_id, e);
                                    addr.do_send(ServerMessage::error(
                                        r#"Expected a JSON object {"message": string}"#,
                                    ));
                                }
                            }
                        }

                        Some(Ok(Message::Ping(data))) => {
                            if ws_session.pong(&data).await.is_err() {
                                break;
                            }
                        }

                        Some(Ok(Message::Close(reason))) => {
                            tracing::debug!("Close frame on room {}: {:?}", room_id, reason);
                            break;
                        }

                        Some(Ok(Message::Binary(_))) => {
                            addr.do_send(ServerMessage::error("Binary frames are not supported"));
                        }

                        Some(Ok(Message::Pong(_) | Message::Continuation(_) | Message::Nop)) => {}

                        Some(Err(e)) => {
                            tracing::warn!("Socket protocol error on room {}: {}", room_id, e);
                            break;
                        }

                        None => break,
                    }
                }

                Some(json) = rx.recv() => {
                    if ws_session.text(json).await.is_err() {
                        break;
                    }
                }
            }
        }

        addr.do_send(Close);
        let _ = ws_session.close(None).await;
    });

    Ok(response)
}
