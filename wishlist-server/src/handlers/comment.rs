use wishlist_common::db::{self, DaoError, DbThreadPool};
use wishlist_common::request_io::inputs::{InputComment, InputCommentId};
use wishlist_common::request_io::outputs::OutputId;
use wishlist_common::validators::Validity;

use actix_web::{web, HttpResponse};

use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::SessionUser;

pub async fn post(
    db_thread_pool: web::Data<DbThreadPool>,
    session_user: SessionUser,
    comment: web::Json<InputComment>,
) -> Result<HttpResponse, HttpErrorResponse> {
    if let Validity::Invalid(msg) = comment.validate() {
        return Err(HttpErrorResponse::IncorrectlyFormed(msg.into()));
    }

    let comment_id = match web::block(move || {
        let comment_dao = db::comment::Dao::new(&db_thread_pool);
        comment_dao.create_comment(comment.wishlist_id, session_user.user_id, &comment.comment)
    })
    .await?
    {
        Ok(id) => id,
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(HttpErrorResponse::DoesNotExist(
                "wishlist entry not found".into(),
            ));
        }
        Err(DaoError::WontRunQuery) => {
            return Err(HttpErrorResponse::UserDisallowed(
                "cannot comment on your own wishlist".into(),
            ));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(
                "Failed to create comment".into(),
            ));
        }
    };

    Ok(HttpResponse::Ok().json(OutputId { id: comment_id }))
}

pub async fn delete(
    db_thread_pool: web::Data<DbThreadPool>,
    session_user: SessionUser,
    comment_id: web::Json<InputCommentId>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let deleted_count = match web::block(move || {
        let comment_dao = db::comment::Dao::new(&db_thread_pool);
        comment_dao.delete_comment(comment_id.id, session_user.user_id)
    })
    .await?
    {
        Ok(count) => count,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(
                "Failed to delete comment".into(),
            ));
        }
    };

    if deleted_count == 0 {
        return Err(HttpErrorResponse::UserDisallowed(
            "comment not found or not authored by user".into(),
        ));
    }

    Ok(HttpResponse::Ok().finish())
}
