use actix_web::{get, post, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        matching::repository_pg::MatchRepositoryPg,
        message::{
            model::{MessagePage, MessageResponse, PageQuery, SendMessageBody},
            repository_pg::MessageRepositoryPg,
            service::MessageService,
        },
        room::repository_pg::RoomRepositoryPg,
        UserRepo,
    },
    utils::{ValidatedJson, ValidatedQuery},
};

pub type MessageSvc =
    MessageService<MessageRepositoryPg, RoomRepositoryPg, UserRepo, MatchRepositoryPg>;

#[get("/{room_id}/messages")]
pub async fn get_messages(
    message_service: web::Data<MessageSvc>,
    path: web::Path<i64>,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
    req: HttpRequest,
) -> Result<success::Success<MessagePage>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let page = message_service.list_messages(path.into_inner(), user_id, query).await?;

    Ok(success::Success::ok(Some(page)))
}

#[post("/{room_id}/send_message")]
pub async fn send_message(
    message_service: web::Data<MessageSvc>,
    path: web::Path<i64>,
    ValidatedJson(body): ValidatedJson<SendMessageBody>,
    req: HttpRequest,
) -> Result<success::Success<MessageResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let message = message_service.append(path.into_inner(), user_id, &body.message).await?;

    Ok(success::Success::created(Some(message)).message("Message sent"))
}

#[get("/{room_id}/unread_count")]
pub async fn unread_count(
    message_service: web::Data<MessageSvc>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> Result<success::Success<i64>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let count = message_service.unread_count_for(path.into_inner(), user_id).await?;

    Ok(success::Success::ok(Some(count)))
}
