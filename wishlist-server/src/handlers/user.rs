use wishlist_common::db::{self, DaoError, DbThreadPool};
use wishlist_common::request_io::inputs::InputNewUser;
use wishlist_common::request_io::outputs::{OutputUser, OutputUserList};
use wishlist_common::token::OpaqueToken;
use wishlist_common::validators::Validity;

use actix_web::{web, HttpRequest, HttpResponse};
use diesel::result::DatabaseErrorKind;

use crate::handlers::error::HttpErrorResponse;
use crate::handlers::{session, verification};
use crate::middleware::auth::SessionUser;

pub async fn sign_up(
    db_thread_pool: web::Data<DbThreadPool>,
    new_user: web::Json<InputNewUser>,
    req: HttpRequest,
) -> Result<HttpResponse, HttpErrorResponse> {
    if let Validity::Invalid(msg) = new_user.validate() {
        return Err(HttpErrorResponse::IncorrectlyFormed(msg.into()));
    }

    let invite_code = OpaqueToken::decode(&new_user.invite_code)
        .map_err(|_| HttpErrorResponse::IncorrectlyFormed("invalid invite code".into()))?;

    let password_hash = verification::hash_password(&new_user.password).await?;

    let first = new_user.first.clone();
    let last = new_user.last.clone();
    let email = new_user.email.clone();
    let db_thread_pool_ref = db_thread_pool.clone();

    let user_id = match web::block(move || {
        let user_dao = db::user::Dao::new(&db_thread_pool_ref);
        user_dao.create_user_with_invite_code(
            &first,
            &last,
            &email,
            &password_hash,
            invite_code.as_bytes(),
        )
    })
    .await?
    {
        Ok(id) => id,
        Err(DaoError::CannotRunQuery(_)) => {
            return Err(HttpErrorResponse::IncorrectlyFormed(
                "invalid invite code".into(),
            ));
        }
        Err(DaoError::QueryFailure(diesel::result::Error::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            _,
        ))) => {
            return Err(HttpErrorResponse::ConflictWithExisting(
                "a user with this email address already exists".into(),
            ));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(
                "Failed to create user".into(),
            ));
        }
    };

    log::info!("User {user_id} signed up");

    let cookie = session::start_session(&db_thread_pool, user_id, &req).await?;

    Ok(HttpResponse::Ok().cookie(cookie).json(OutputUser {
        id: user_id,
        first: new_user.first.clone(),
        last: new_user.last.clone(),
    }))
}

pub async fn list_users(
    db_thread_pool: web::Data<DbThreadPool>,
    _session_user: SessionUser,
) -> Result<HttpResponse, HttpErrorResponse> {
    let users = match web::block(move || {
        let user_dao = db::user::Dao::new(&db_thread_pool);
        user_dao.get_all_users()
    })
    .await?
    {
        Ok(u) => u,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(
                "Failed to get users".into(),
            ));
        }
    };

    Ok(HttpResponse::Ok().json(OutputUserList {
        users: users.into_iter().map(OutputUser::from).collect(),
    }))
}
