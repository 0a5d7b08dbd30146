use actix_web::web::*;

use crate::handlers::comment;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        resource("/comments")
            .route(post().to(comment::post))
            .route(delete().to(comment::delete)),
    );
}
