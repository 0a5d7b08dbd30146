use actix_web::web::*;

use crate::handlers::{admin, health};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(resource("/admin/invite-code").route(post().to(admin::create_invite_code)))
        .route("/heartbeat", get().to(health::heartbeat));
}
