use actix_web::web::{scope, ServiceConfig};

use crate::modules::room::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/chatroom")
            .service(list_rooms)
            .service(get_room)
            .configure(crate::modules::message::route::configure),
    );
}
