use wishlist_common::db::{self, DaoError, DbThreadPool};
use wishlist_common::request_io::inputs::InputInviteCodeRequest;
use wishlist_common::request_io::outputs::OutputInviteCode;
use wishlist_common::token::OpaqueToken;

use actix_web::{web, HttpResponse};
use diesel::result::DatabaseErrorKind;
use std::time::Duration;

use crate::env;
use crate::handlers::error::HttpErrorResponse;
use crate::middleware::admin_key::AdminKey;

const SECONDS_PER_DAY: u64 = 86400;

pub async fn create_invite_code(
    db_thread_pool: web::Data<DbThreadPool>,
    _admin_key: AdminKey,
    invite_request: web::Json<InputInviteCodeRequest>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let lifetime = match invite_request.lifetime_days {
        Some(0) => {
            return Err(HttpErrorResponse::IncorrectlyFormed(
                "lifetime_days must be greater than zero".into(),
            ));
        }
        Some(days) => match days.checked_mul(SECONDS_PER_DAY) {
            Some(secs) => Duration::from_secs(secs),
            None => {
                return Err(HttpErrorResponse::IncorrectlyFormed(
                    "lifetime_days is too large".into(),
                ));
            }
        },
        None => env::CONF.invite_code_lifetime,
    };

    let bound_user_id = invite_request.user_id;
    let invite_code = OpaqueToken::generate();
    let invite_code_ref = invite_code.clone();

    let expiry_time = match web::block(move || {
        let invite_dao = db::invite::Dao::new(&db_thread_pool);
        invite_dao.create_invite_code(invite_code_ref.as_bytes(), bound_user_id, lifetime)
    })
    .await?
    {
        Ok(e) => e,
        Err(DaoError::CannotRunQuery(msg)) => {
            return Err(HttpErrorResponse::IncorrectlyFormed(msg.into()));
        }
        Err(DaoError::QueryFailure(diesel::result::Error::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            _,
        ))) => {
            return Err(HttpErrorResponse::DoesNotExist(
                "bound user not found".into(),
            ));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(
                "Failed to create invite code".into(),
            ));
        }
    };

    match bound_user_id {
        Some(id) => log::info!("Issued invite code on behalf of user {id}, expiring at {expiry_time}"),
        None => log::info!("Issued invite code expiring at {expiry_time}"),
    }

    Ok(HttpResponse::Ok().json(OutputInviteCode {
        invite_code: invite_code.encode(),
        expiry_time,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use chrono::Utc;
    use serde_json::json;

    use wishlist_common::request_io::outputs::OutputUser;
    use wishlist_common::test_utils::TestDb;

    use crate::handlers::test_utils::{self as handler_test_utils, TEST_PASSWORD};
    use crate::middleware::admin_key::ADMIN_KEY_HEADER;

    #[actix_rt::test]
    async fn test_create_invite_code() {
        let db = TestDb::new();
        let app = handler_test_utils::init_app(db.pool()).await;

        let req = TestRequest::post()
            .uri("/admin/invite-code")
            .insert_header((ADMIN_KEY_HEADER, env::TEST_ADMIN_KEY))
            .set_json(json!({ "lifetime_days": 2 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let invite = handler_test_utils::read_json::<OutputInviteCode>(resp).await;
        let lifetime = invite.expiry_time - Utc::now().naive_utc();
        assert!(lifetime > chrono::Duration::days(1));
        assert!(lifetime <= chrono::Duration::days(2));

        let req = TestRequest::post()
            .uri("/api/signup")
            .set_json(json!({
                "first": "Jane",
                "last": "Doe",
                "email": "jane@example.com",
                "password": TEST_PASSWORD,
                "invite_code": invite.invite_code,
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let jane = handler_test_utils::read_json::<OutputUser>(resp).await;

        // Issued on behalf of an existing user, with the default lifetime
        let req = TestRequest::post()
            .uri("/admin/invite-code")
            .insert_header((ADMIN_KEY_HEADER, env::TEST_ADMIN_KEY))
            .set_json(json!({ "user_id": jane.id }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let invite = handler_test_utils::read_json::<OutputInviteCode>(resp).await;
        let lifetime = invite.expiry_time - Utc::now().naive_utc();
        assert!(lifetime > chrono::Duration::days(29));

        let req = TestRequest::post()
            .uri("/admin/invite-code")
            .insert_header((ADMIN_KEY_HEADER, env::TEST_ADMIN_KEY))
            .set_json(json!({ "user_id": jane.id + 100 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = TestRequest::post()
            .uri("/admin/invite-code")
            .insert_header((ADMIN_KEY_HEADER, env::TEST_ADMIN_KEY))
            .set_json(json!({ "lifetime_days": 0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_create_invite_code_requires_admin_key() {
        let db = TestDb::new();
        let app = handler_test_utils::init_app(db.pool()).await;

        let req = TestRequest::post()
            .uri("/admin/invite-code")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = TestRequest::post()
            .uri("/admin/invite-code")
            .insert_header((ADMIN_KEY_HEADER, "test-admin-key-000000"))
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
