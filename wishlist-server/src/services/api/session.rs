use actix_web::web::*;

use crate::handlers::session;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        resource("/session")
            .route(post().to(session::sign_in))
            .route(get().to(session::get_current_user))
            .route(delete().to(session::sign_out)),
    );
}
