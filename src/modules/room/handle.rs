use actix_web::{get, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        room::{model::RoomSummary, repository_pg::RoomRepositoryPg, service::RoomService},
        UserRepo,
    },
};

pub type RoomSvc = RoomService<RoomRepositoryPg, UserRepo>;

#[get("")]
pub async fn list_rooms(
    room_service: web::Data<RoomSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<RoomSummary>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let rooms = room_service.list_for_user(user_id).await?;

    Ok(success::Success::ok(Some(rooms)))
}

#[get("/{room_id}")]
pub async fn get_room(
    room_service: web::Data<RoomSvc>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> Result<success::Success<RoomSummary>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let room = room_service.get_for_user(path.into_inner(), user_id).await?;

    Ok(success::Success::ok(Some(room)))
}
