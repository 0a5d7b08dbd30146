pub mod comment;
pub mod invite_code;
pub mod job_registry_item;
pub mod session;
pub mod user;
pub mod wishlist_entry;
