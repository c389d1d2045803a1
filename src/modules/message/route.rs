use actix_web::web::ServiceConfig;

use crate::modules::message::handle::*;

/// Registered inside the `/chatroom` scope.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(get_messages).service(send_message).service(unread_count);
}
