use actix_web::web::{scope, ServiceConfig};

use crate::modules::matching::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/interactions").service(like).service(dislike).service(view))
        .service(scope("/matches").service(list_matches));
}
