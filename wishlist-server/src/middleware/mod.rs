pub mod admin_key;
pub mod auth;

mod request_log;

pub use request_log::RequestLog;
