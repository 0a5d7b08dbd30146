use actix_web::web::*;

mod comment;
mod session;
mod user;
mod wishlist;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/api")
            .configure(session::configure)
            .configure(user::configure)
            .configure(wishlist::configure)
            .configure(comment::configure),
    );
}
