use actix_web::web::*;

use crate::handlers::wishlist;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        resource("/wishlist")
            .route(get().to(wishlist::get))
            .route(post().to(wishlist::add))
            .route(patch().to(wishlist::patch))
            .route(delete().to(wishlist::delete)),
    );
}
