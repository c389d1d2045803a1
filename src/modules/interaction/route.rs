use actix_web::web::{scope, ServiceConfig};

use crate::modules::interaction::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/history")
            .service(received_likes)
            .service(likes)
            .service(dislikes)
            .service(views),
    );
}
