use actix_web::web::*;

use crate::handlers::user;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(resource("/signup").route(post().to(user::sign_up)))
        .service(resource("/users").route(get().to(user::list_users)));
}
