use actix_web::{get, post, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        interaction::{repository_pg::InteractionRepositoryPg, schema::SignalKind},
        matching::{
            model::{MatchResponse, MatchStatus, SignalOutcome},
            repository_pg::MatchRepositoryPg,
            service::MatchService,
        },
        room::repository_pg::RoomRepositoryPg,
        UserRepo,
    },
};

pub type MatchSvc =
    MatchService<InteractionRepositoryPg, MatchRepositoryPg, RoomRepositoryPg, UserRepo>;

async fn signal(
    service: &MatchSvc,
    req: &HttpRequest,
    target_id: i64,
    kind: SignalKind,
) -> Result<success::Success<SignalOutcome>, error::Error> {
    let user_id = get_claims(req)?.sub;
    let outcome = service.record_signal(user_id, target_id, kind).await?;

    let message = match outcome.status {
        MatchStatus::Pending => "Like recorded",
        MatchStatus::Formed => "It's a match",
        MatchStatus::AlreadyMatched => "Already matched",
        MatchStatus::Retracted => "Match removed",
        MatchStatus::Recorded => "Signal recorded",
    };

    Ok(success::Success::ok(Some(outcome)).message(message))
}

#[post("/{user_id}/like")]
pub async fn like(
    service: web::Data<MatchSvc>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> Result<success::Success<SignalOutcome>, error::Error> {
    signal(&service, &req, path.into_inner(), SignalKind::Like).await
}

#[post("/{user_id}/dislike")]
pub async fn dislike(
    service: web::Data<MatchSvc>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> Result<success::Success<SignalOutcome>, error::Error> {
    signal(&service, &req, path.into_inner(), SignalKind::Dislike).await
}

#[post("/{user_id}/view")]
pub async fn view(
    service: web::Data<MatchSvc>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> Result<success::Success<SignalOutcome>, error::Error> {
    signal(&service, &req, path.into_inner(), SignalKind::View).await
}

#[get("")]
pub async fn list_matches(
    service: web::Data<MatchSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<MatchResponse>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let matches = service.list_active(user_id).await?;

    Ok(success::Success::ok(Some(matches)))
}
