use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures::future;

use crate::env;
use crate::handlers::error::HttpErrorResponse;

pub const ADMIN_KEY_HEADER: &str = "AdminKey";

/// Proof that the request carried the configured admin key. When no admin key is configured,
/// extraction always fails.
#[derive(Debug)]
pub struct AdminKey;

impl FromRequest for AdminKey {
    type Error = HttpErrorResponse;
    type Future = future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let key = req
            .headers()
            .get(ADMIN_KEY_HEADER)
            .and_then(|h| h.to_str().ok());

        if is_admin_key_correct(key, env::CONF.admin_key.as_deref()) {
            future::ok(AdminKey)
        } else {
            future::err(HttpErrorResponse::UserDisallowed(
                "missing or incorrect admin key".into(),
            ))
        }
    }
}

#[inline]
fn is_admin_key_correct(key: Option<&str>, correct_key: Option<&str>) -> bool {
    let (Some(key), Some(correct_key)) = (key, correct_key) else {
        return false;
    };

    let correct_key = correct_key.as_bytes();
    let key = key.as_bytes();

    if correct_key.len() != key.len() || key.is_empty() {
        return false;
    }

    let mut keys_dont_match = 0u8;

    // Do bitwise comparison to prevent timing attacks
    for (correct_key_byte, key_byte) in correct_key.iter().zip(key) {
        keys_dont_match |= correct_key_byte ^ key_byte;
    }

    keys_dont_match == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_admin_key_correct() {
        assert!(is_admin_key_correct(Some("s3cret"), Some("s3cret")));

        assert!(!is_admin_key_correct(Some("s3cres"), Some("s3cret")));
        assert!(!is_admin_key_correct(Some("s3cre"), Some("s3cret")));
        assert!(!is_admin_key_correct(None, Some("s3cret")));
        assert!(!is_admin_key_correct(Some(""), Some("")));

        // No configured key refuses everything
        assert!(!is_admin_key_correct(Some("s3cret"), None));
        assert!(!is_admin_key_correct(None, None));
    }
}
