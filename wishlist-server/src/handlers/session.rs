use wishlist_common::db::{self, DaoError, DbThreadPool};
use wishlist_common::request_io::inputs::CredentialPair;
use wishlist_common::request_io::outputs::OutputUser;
use wishlist_common::token::OpaqueToken;
use wishlist_common::validators::Validity;

use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::env;
use crate::handlers::error::HttpErrorResponse;
use crate::handlers::verification;
use crate::middleware::auth::{self, SessionUser};

const MAX_USER_AGENT_LENGTH: usize = 512;

pub async fn sign_in(
    db_thread_pool: web::Data<DbThreadPool>,
    credentials: web::Json<CredentialPair>,
    req: HttpRequest,
) -> Result<HttpResponse, HttpErrorResponse> {
    if let Validity::Invalid(msg) = credentials.validate() {
        return Err(HttpErrorResponse::IncorrectlyFormed(msg.into()));
    }

    let email = credentials.email.clone();
    let db_thread_pool_ref = db_thread_pool.clone();

    let user = match web::block(move || {
        let user_dao = db::user::Dao::new(&db_thread_pool_ref);
        user_dao.get_user_credentials(&email)
    })
    .await?
    {
        Ok(u) => Some(u),
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => None,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(
                "Failed to get user credentials".into(),
            ));
        }
    };

    let password_hash = user.as_ref().map(|u| u.password_hash.clone());
    let does_password_match =
        verification::verify_password(&credentials.password, password_hash).await?;

    let user = match user {
        Some(u) if does_password_match => u,
        _ => {
            return Err(HttpErrorResponse::IncorrectCredential(
                "invalid username or password".into(),
            ))
        }
    };

    let cookie = start_session(&db_thread_pool, user.id, &req).await?;
    log::info!("User {} signed in", user.id);

    Ok(HttpResponse::Ok().cookie(cookie).json(OutputUser {
        id: user.id,
        first: user.first_name,
        last: user.last_name,
    }))
}

pub async fn get_current_user(
    db_thread_pool: web::Data<DbThreadPool>,
    session_user: SessionUser,
) -> Result<HttpResponse, HttpErrorResponse> {
    let user = match web::block(move || {
        let user_dao = db::user::Dao::new(&db_thread_pool);
        user_dao.get_user_id_and_name(session_user.user_id)
    })
    .await?
    {
        Ok(u) => u,
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(HttpErrorResponse::DoesNotExist("user not found".into()));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError("Failed to get user".into()));
        }
    };

    Ok(HttpResponse::Ok().json(OutputUser::from(user)))
}

pub async fn sign_out(
    db_thread_pool: web::Data<DbThreadPool>,
    req: HttpRequest,
) -> Result<HttpResponse, HttpErrorResponse> {
    if let Ok(token) = auth::session_token_from_request(&req) {
        let result = web::block(move || {
            let session_dao = db::session::Dao::new(&db_thread_pool);
            session_dao.delete_session(token.as_bytes())
        })
        .await;

        match result {
            Ok(Ok(_)) => (),
            Ok(Err(e)) => log::error!("Failed to delete session: {e}"),
            Err(e) => log::error!("Failed to delete session: {e}"),
        }
    }

    Ok(HttpResponse::Ok()
        .cookie(auth::session_removal_cookie())
        .finish())
}

/// Stores a fresh session for `user_id` and returns the cookie that carries it.
pub async fn start_session(
    db_thread_pool: &DbThreadPool,
    user_id: i64,
    req: &HttpRequest,
) -> Result<Cookie<'static>, HttpErrorResponse> {
    let token = OpaqueToken::generate();
    let token_ref = token.clone();

    let user_agent: String = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .chars()
        .take(MAX_USER_AGENT_LENGTH)
        .collect();

    let db_thread_pool = db_thread_pool.clone();

    let expiry_time = match web::block(move || {
        let session_dao = db::session::Dao::new(&db_thread_pool);
        session_dao.create_session(
            token_ref.as_bytes(),
            user_id,
            &user_agent,
            env::CONF.session_lifetime,
        )
    })
    .await?
    {
        Ok(e) => e,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(
                "Failed to create session".into(),
            ));
        }
    };

    log::info!("Created session for user {user_id} expiring at {expiry_time}");

    Ok(auth::session_cookie(&token, expiry_time))
}
