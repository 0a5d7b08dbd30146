pub mod admin;
pub mod comment;
pub mod health;
pub mod session;
pub mod user;
pub mod wishlist;

pub mod verification {
    use argon2_kdf::{Algorithm, Hash, Hasher, Secret};
    use once_cell::sync::Lazy;
    use std::str::FromStr;
    use std::sync::Arc;
    use tokio::sync::oneshot;
    use zeroize::Zeroizing;

    use wishlist_common::threadrand::SecureRng;

    use super::error::HttpErrorResponse;
    use crate::env;

    // Verified against when the email is unknown so that a login attempt costs one Argon2
    // verification either way
    static DUMMY_PASSWORD_HASH: Lazy<Option<String>> = Lazy::new(|| {
        let mut password = Zeroizing::new([0u8; 32]);
        SecureRng::fill_bytes(&mut password[..]);

        match build_hasher().hash(&password[..]) {
            Ok(h) => Some(h.to_string()),
            Err(e) => {
                log::error!("Failed to generate dummy password hash: {e}");
                None
            }
        }
    });

    fn build_hasher() -> Hasher<'static> {
        Hasher::default()
            .algorithm(Algorithm::Argon2id)
            .salt_length(env::CONF.hash_salt_length)
            .hash_length(env::CONF.hash_length)
            .iterations(env::CONF.hash_iterations)
            .memory_cost_kib(env::CONF.hash_mem_cost_kib)
            .threads(env::CONF.hash_threads)
            .secret(Secret::using_bytes(&env::CONF.hashing_key))
    }

    pub async fn hash_password(password: &str) -> Result<String, HttpErrorResponse> {
        let password = Arc::new(Zeroizing::new(String::from(password)));

        let (sender, receiver) = oneshot::channel();

        rayon::spawn(move || {
            let hash_result = build_hasher()
                .hash(password.as_bytes())
                .map(|h| h.to_string());

            // The receiver is gone only if the request was dropped
            let _ = sender.send(hash_result);
        });

        match receiver.await? {
            Ok(h) => Ok(h),
            Err(e) => {
                log::error!("{e}");
                Err(HttpErrorResponse::InternalError(
                    "Failed to hash password".into(),
                ))
            }
        }
    }

    /// Checks `password` against `password_hash`. If `password_hash` is `None` (i.e. the user
    /// doesn't exist) the password is still verified against a dummy hash and `false` is
    /// returned. A stored hash that can't be parsed is logged and also yields `false`.
    pub async fn verify_password(
        password: &str,
        password_hash: Option<String>,
    ) -> Result<bool, HttpErrorResponse> {
        let password = Arc::new(Zeroizing::new(String::from(password)));
        let is_real_hash = password_hash.is_some();

        let (sender, receiver) = oneshot::channel();

        rayon::spawn(move || {
            let encoded_hash = match password_hash {
                Some(h) => h,
                None => match DUMMY_PASSWORD_HASH.as_ref() {
                    Some(h) => h.clone(),
                    None => {
                        let _ = sender.send(Ok(false));
                        return;
                    }
                },
            };

            let hash = match Hash::from_str(&encoded_hash) {
                Ok(h) => h,
                Err(e) => {
                    let _ = sender.send(Err(e));
                    return;
                }
            };

            let does_password_match_hash = hash.verify_with_secret(
                password.as_bytes(),
                Secret::using_bytes(&env::CONF.hashing_key),
            );

            let _ = sender.send(Ok(does_password_match_hash));
        });

        match receiver.await? {
            Ok(matches) => Ok(matches && is_real_hash),
            Err(e) => {
                log::error!("Stored password hash could not be parsed: {e}");
                Ok(false)
            }
        }
    }

}

pub mod error {
    use actix_web::error::JsonPayloadError;
    use actix_web::http::StatusCode;
    use actix_web::{HttpRequest, HttpResponse};
    use serde_json::json;
    use std::borrow::Cow;
    use std::fmt;
    use tokio::sync::oneshot;

    use wishlist_common::token::TokenError;

    #[derive(Debug)]
    pub enum HttpErrorResponse {
        // 400
        IncorrectlyFormed(Cow<'static, str>),
        ConflictWithExisting(Cow<'static, str>),

        // 401
        IncorrectCredential(Cow<'static, str>),
        SessionMissing(Cow<'static, str>),
        SessionExpired(Cow<'static, str>),
        UserDisallowed(Cow<'static, str>),

        // 404
        DoesNotExist(Cow<'static, str>),

        // 409
        OutOfDate { client_seq: i64, current_seq: i64 },

        // 413
        InputTooLarge(Cow<'static, str>),

        // 415
        UnsupportedMediaType(Cow<'static, str>),

        // 500
        InternalError(Cow<'static, str>),
    }

    impl HttpErrorResponse {
        pub fn message(&self) -> &str {
            match self {
                HttpErrorResponse::IncorrectlyFormed(msg)
                | HttpErrorResponse::ConflictWithExisting(msg)
                | HttpErrorResponse::IncorrectCredential(msg)
                | HttpErrorResponse::SessionMissing(msg)
                | HttpErrorResponse::SessionExpired(msg)
                | HttpErrorResponse::UserDisallowed(msg)
                | HttpErrorResponse::DoesNotExist(msg)
                | HttpErrorResponse::InputTooLarge(msg)
                | HttpErrorResponse::UnsupportedMediaType(msg)
                | HttpErrorResponse::InternalError(msg) => msg,
                HttpErrorResponse::OutOfDate { .. } => "out of date",
            }
        }
    }

    impl std::error::Error for HttpErrorResponse {}

    impl fmt::Display for HttpErrorResponse {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                HttpErrorResponse::OutOfDate {
                    client_seq,
                    current_seq,
                } => write!(
                    f,
                    "{} (client seq {client_seq}, current seq {current_seq})",
                    self.message()
                ),
                _ => write!(f, "{}", self.message()),
            }
        }
    }

    impl actix_web::error::ResponseError for HttpErrorResponse {
        fn error_response(&self) -> HttpResponse {
            let body = match self {
                HttpErrorResponse::OutOfDate {
                    client_seq,
                    current_seq,
                } => json!({
                    "error": self.message(),
                    "client_seq": client_seq,
                    "current_seq": current_seq,
                }),
                _ => json!({ "error": self.message() }),
            };

            HttpResponse::build(self.status_code()).json(body)
        }

        fn status_code(&self) -> StatusCode {
            match *self {
                HttpErrorResponse::IncorrectlyFormed(_)
                | HttpErrorResponse::ConflictWithExisting(_) => StatusCode::BAD_REQUEST,
                HttpErrorResponse::IncorrectCredential(_)
                | HttpErrorResponse::SessionMissing(_)
                | HttpErrorResponse::SessionExpired(_)
                | HttpErrorResponse::UserDisallowed(_) => StatusCode::UNAUTHORIZED,
                HttpErrorResponse::DoesNotExist(_) => StatusCode::NOT_FOUND,
                HttpErrorResponse::OutOfDate { .. } => StatusCode::CONFLICT,
                HttpErrorResponse::InputTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
                HttpErrorResponse::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                HttpErrorResponse::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl From<actix_web::error::BlockingError> for HttpErrorResponse {
        fn from(_err: actix_web::error::BlockingError) -> Self {
            HttpErrorResponse::InternalError("Actix thread pool failure".into())
        }
    }

    impl From<oneshot::error::RecvError> for HttpErrorResponse {
        fn from(_err: oneshot::error::RecvError) -> Self {
            HttpErrorResponse::InternalError("Rayon thread pool failure".into())
        }
    }

    impl From<TokenError> for HttpErrorResponse {
        fn from(err: TokenError) -> Self {
            match err {
                TokenError::TokenInvalid => {
                    HttpErrorResponse::IncorrectlyFormed("malformed session cookie".into())
                }
                TokenError::TokenExpired => {
                    HttpErrorResponse::SessionExpired("session is invalid or expired".into())
                }
                TokenError::TokenMissing => {
                    HttpErrorResponse::SessionMissing("session cookie is missing".into())
                }
            }
        }
    }

    /// Error handler for `web::JsonConfig` so that body extraction failures come back in the
    /// same shape as every other error.
    pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
        let resp = match &err {
            JsonPayloadError::ContentType => HttpErrorResponse::UnsupportedMediaType(
                "expected Content-Type: application/json".into(),
            ),
            JsonPayloadError::Overflow { limit } => {
                HttpErrorResponse::InputTooLarge(format!("body is larger than {limit} bytes").into())
            }
            JsonPayloadError::OverflowKnownLength { limit, .. } => {
                HttpErrorResponse::InputTooLarge(format!("body is larger than {limit} bytes").into())
            }
            e => HttpErrorResponse::IncorrectlyFormed(format!("malformed JSON: {e}").into()),
        };

        resp.into()
    }

    pub fn query_error_handler(
        err: actix_web::error::QueryPayloadError,
        _req: &HttpRequest,
    ) -> actix_web::Error {
        HttpErrorResponse::IncorrectlyFormed(format!("malformed query: {err}").into()).into()
    }
}
