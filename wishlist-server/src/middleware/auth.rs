use actix_web::cookie::time::OffsetDateTime;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::web::{self, Data};
use actix_web::{FromRequest, HttpRequest};
use chrono::{NaiveDateTime, Utc};
use futures::future::{self, LocalBoxFuture};

use wishlist_common::db::{self, DaoError, DbThreadPool};
use wishlist_common::token::{OpaqueToken, TokenError};

use crate::handlers::error::HttpErrorResponse;

pub const SESSION_COOKIE_NAME: &str = "wishlist_session_id";

/// The user behind a valid, unexpired session cookie. Handlers that take a `SessionUser`
/// are only reached by authenticated requests.
#[derive(Clone, Copy, Debug)]
pub struct SessionUser {
    pub user_id: i64,
}

impl FromRequest for SessionUser {
    type Error = HttpErrorResponse;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = match session_token_from_request(req) {
            Ok(t) => t,
            Err(e) => return Box::pin(future::err(e.into())),
        };

        let db_thread_pool = match req.app_data::<Data<DbThreadPool>>() {
            Some(p) => p.get_ref().clone(),
            None => {
                log::error!("DB thread pool is missing from app data");
                return Box::pin(future::err(HttpErrorResponse::InternalError(
                    "Failed to look up session".into(),
                )));
            }
        };

        Box::pin(async move {
            let (user_id, expiry_time) = match web::block(move || {
                let session_dao = db::session::Dao::new(&db_thread_pool);
                session_dao.get_session_user(token.as_bytes())
            })
            .await?
            {
                Ok(s) => s,
                Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
                    return Err(TokenError::TokenExpired.into());
                }
                Err(e) => {
                    log::error!("{e}");
                    return Err(HttpErrorResponse::InternalError(
                        "Failed to look up session".into(),
                    ));
                }
            };

            if expiry_time < Utc::now().naive_utc() {
                return Err(TokenError::TokenExpired.into());
            }

            Ok(SessionUser { user_id })
        })
    }
}

pub fn session_token_from_request(req: &HttpRequest) -> Result<OpaqueToken, TokenError> {
    let cookie = req
        .cookie(SESSION_COOKIE_NAME)
        .ok_or(TokenError::TokenMissing)?;

    OpaqueToken::decode(cookie.value())
}

pub fn session_cookie(token: &OpaqueToken, expiry_time: NaiveDateTime) -> Cookie<'static> {
    let expires = OffsetDateTime::from_unix_timestamp(expiry_time.and_utc().timestamp())
        .unwrap_or(OffsetDateTime::UNIX_EPOCH);

    base_cookie(token.encode()).expires(expires).finish()
}

pub fn session_removal_cookie() -> Cookie<'static> {
    let mut cookie = base_cookie(String::new()).finish();
    cookie.make_removal();
    cookie
}

fn base_cookie(value: String) -> actix_web::cookie::CookieBuilder<'static> {
    Cookie::build(SESSION_COOKIE_NAME, value)
        .secure(true)
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use actix_web::{App, HttpResponse};

    use wishlist_common::test_utils::TestDb;

    async fn whoami(session_user: SessionUser) -> HttpResponse {
        HttpResponse::Ok().body(session_user.user_id.to_string())
    }

    #[actix_rt::test]
    async fn test_session_user_extraction() {
        let db = TestDb::new();
        let user_id = db.insert_user("Jane", "Doe", "jane@example.com");

        let token = OpaqueToken::generate();
        db.insert_session(token.as_bytes(), user_id);

        let expired_token = OpaqueToken::generate();
        db.insert_expired_session(expired_token.as_bytes(), user_id);

        let app = test::init_service(
            App::new()
                .app_data(Data::new(db.pool().clone()))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = TestRequest::get()
            .uri("/whoami")
            .cookie(Cookie::new(SESSION_COOKIE_NAME, token.encode()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, user_id.to_string());

        let req = TestRequest::get().uri("/whoami").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = TestRequest::get()
            .uri("/whoami")
            .cookie(Cookie::new(SESSION_COOKIE_NAME, "not*base64"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let unknown_token = OpaqueToken::generate();
        let req = TestRequest::get()
            .uri("/whoami")
            .cookie(Cookie::new(SESSION_COOKIE_NAME, unknown_token.encode()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let unknown_body = test::read_body(resp).await;

        let req = TestRequest::get()
            .uri("/whoami")
            .cookie(Cookie::new(SESSION_COOKIE_NAME, expired_token.encode()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let expired_body = test::read_body(resp).await;

        assert_eq!(unknown_body, expired_body);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let token = OpaqueToken::generate();
        let expiry_time = Utc::now().naive_utc();
        let cookie = session_cookie(&token, expiry_time);

        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), token.encode());
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.expires_datetime().map(|e| e.unix_timestamp()),
            Some(expiry_time.and_utc().timestamp())
        );

        let removal = session_removal_cookie();
        assert_eq!(removal.name(), SESSION_COOKIE_NAME);
        assert_eq!(removal.value(), "");
        assert!(removal.expires_datetime().is_some());
    }
}
