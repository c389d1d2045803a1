use actix_web::{get, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        interaction::{
            model::{Direction, HistoryEntry},
            repository_pg::InteractionRepositoryPg,
            schema::SignalKind,
            service::InteractionService,
        },
        UserRepo,
    },
};

pub type InteractionSvc = InteractionService<InteractionRepositoryPg, UserRepo>;

async fn history(
    service: &InteractionSvc,
    req: &HttpRequest,
    kind: SignalKind,
    direction: Direction,
) -> Result<success::Success<Vec<HistoryEntry>>, error::Error> {
    let user_id = get_claims(req)?.sub;
    let entries = service.history(user_id, kind, direction).await?;
    Ok(success::Success::ok(Some(entries)))
}

/// Who liked me.
#[get("/received_likes")]
pub async fn received_likes(
    service: web::Data<InteractionSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<HistoryEntry>>, error::Error> {
    history(&service, &req, SignalKind::Like, Direction::Received).await
}

#[get("/likes")]
pub async fn likes(
    service: web::Data<InteractionSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<HistoryEntry>>, error::Error> {
    history(&service, &req, SignalKind::Like, Direction::Sent).await
}

#[get("/dislikes")]
pub async fn dislikes(
    service: web::Data<InteractionSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<HistoryEntry>>, error::Error> {
    history(&service, &req, SignalKind::Dislike, Direction::Sent).await
}

#[get("/views")]
pub async fn views(
    service: web::Data<InteractionSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<HistoryEntry>>, error::Error> {
    history(&service, &req, SignalKind::View, Direction::Sent).await
}
