use actix_web::web::{JsonConfig, QueryConfig, ServiceConfig};

use crate::handlers::error;

pub mod api;
pub mod web;

pub const MAX_JSON_BODY_SIZE: usize = 64 * 1024;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.app_data(
        JsonConfig::default()
            .limit(MAX_JSON_BODY_SIZE)
            .error_handler(error::json_error_handler),
    )
    .app_data(QueryConfig::default().error_handler(error::query_error_handler))
    .configure(api::configure)
    .configure(web::configure);
}
