use wishlist_common::db::comment::CommentWithAuthor;
use wishlist_common::db::{self, DaoError, DbThreadPool};
use wishlist_common::models::wishlist_entry::WishlistEntry;
use wishlist_common::request_io::inputs::{
    InputEntryIds, InputWishlistEntry, InputWishlistOwner, InputWishlistPatch,
};
use wishlist_common::request_io::outputs::{
    OutputComment, OutputDeletedCount, OutputId, OutputIdAndSeq, OutputUser, OutputWishlist,
    OutputWishlistEntry,
};
use wishlist_common::validators::Validity;

use actix_web::{web, HttpResponse};
use std::collections::HashMap;

use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::SessionUser;

const OWNER_VIEW_HEADERS: &[&str] = &[
    "id",
    "seq",
    "description",
    "source",
    "cost",
    "owner_notes",
    "creation_time",
];

const BUYER_VIEW_HEADERS: &[&str] = &[
    "id",
    "seq",
    "description",
    "source",
    "cost",
    "owner_notes",
    "buyer_notes",
    "comments",
    "creation_time",
];

pub async fn get(
    db_thread_pool: web::Data<DbThreadPool>,
    session_user: SessionUser,
    owner: web::Query<InputWishlistOwner>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let owner_id = owner.user_id.unwrap_or(session_user.user_id);
    let is_owner = owner_id == session_user.user_id;

    let (owner, entries, comments) = match web::block(move || {
        let user_dao = db::user::Dao::new(&db_thread_pool);
        let wishlist_dao = db::wishlist::Dao::new(&db_thread_pool);
        let comment_dao = db::comment::Dao::new(&db_thread_pool);

        let owner = user_dao.get_user_id_and_name(owner_id)?;
        let entries = wishlist_dao.get_entries_for_user(owner_id)?;

        // Owners never see the comments on their own wishlist
        let comments = if is_owner {
            Vec::new()
        } else {
            comment_dao.get_comments_for_wishlist_owner(owner_id)?
        };

        Ok::<_, DaoError>((owner, entries, comments))
    })
    .await?
    {
        Ok(w) => w,
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(HttpErrorResponse::DoesNotExist("user not found".into()));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(
                "Failed to get wishlist".into(),
            ));
        }
    };

    let headers = if is_owner {
        OWNER_VIEW_HEADERS
    } else {
        BUYER_VIEW_HEADERS
    };

    let entries = if is_owner {
        entries
            .into_iter()
            .map(OutputWishlistEntry::for_owner)
            .collect()
    } else {
        build_buyer_view(entries, comments)
    };

    Ok(HttpResponse::Ok().json(OutputWishlist {
        user: OutputUser::from(owner),
        headers: headers.iter().map(|h| String::from(*h)).collect(),
        entries,
    }))
}

fn build_buyer_view(
    entries: Vec<WishlistEntry>,
    comments: Vec<CommentWithAuthor>,
) -> Vec<OutputWishlistEntry> {
    let mut comments_by_entry: HashMap<i64, Vec<OutputComment>> = HashMap::new();

    // Comments arrive ordered by ID, so each entry's list stays ordered
    for comment in comments {
        comments_by_entry
            .entry(comment.wishlist_id)
            .or_default()
            .push(OutputComment::from(comment));
    }

    entries
        .into_iter()
        .map(|entry| {
            let comments = comments_by_entry.remove(&entry.id).unwrap_or_default();
            OutputWishlistEntry::for_other_user(entry, comments)
        })
        .collect()
}

pub async fn add(
    db_thread_pool: web::Data<DbThreadPool>,
    session_user: SessionUser,
    entry: web::Json<InputWishlistEntry>,
) -> Result<HttpResponse, HttpErrorResponse> {
    if let Validity::Invalid(msg) = entry.validate() {
        return Err(HttpErrorResponse::IncorrectlyFormed(msg.into()));
    }

    let entry_id = match web::block(move || {
        let wishlist_dao = db::wishlist::Dao::new(&db_thread_pool);
        wishlist_dao.create_entry(
            session_user.user_id,
            &entry.description,
            &entry.source,
            &entry.cost,
            entry.owner_notes.as_deref(),
        )
    })
    .await?
    {
        Ok(id) => id,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(
                "Failed to create wishlist entry".into(),
            ));
        }
    };

    Ok(HttpResponse::Ok().json(OutputId { id: entry_id }))
}

pub async fn patch(
    db_thread_pool: web::Data<DbThreadPool>,
    session_user: SessionUser,
    patch: web::Json<InputWishlistPatch>,
) -> Result<HttpResponse, HttpErrorResponse> {
    if let Validity::Invalid(msg) = patch.validate() {
        return Err(HttpErrorResponse::IncorrectlyFormed(msg.into()));
    }

    let entry_id = patch.id;
    let client_seq = patch.seq;
    let wishlist_patch = patch.to_patch();

    let new_seq = match web::block(move || {
        let wishlist_dao = db::wishlist::Dao::new(&db_thread_pool);
        wishlist_dao.update_entry(entry_id, session_user.user_id, client_seq, &wishlist_patch)
    })
    .await?
    {
        Ok(seq) => seq,
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(HttpErrorResponse::DoesNotExist(
                "wishlist entry not found".into(),
            ));
        }
        Err(DaoError::OutOfDate { current_seq }) => {
            return Err(HttpErrorResponse::OutOfDate {
                client_seq,
                current_seq,
            });
        }
        Err(DaoError::CannotRunQuery(msg)) => {
            return Err(HttpErrorResponse::IncorrectlyFormed(msg.into()));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(
                "Failed to update wishlist entry".into(),
            ));
        }
    };

    Ok(HttpResponse::Ok().json(OutputIdAndSeq {
        id: entry_id,
        seq: new_seq,
    }))
}

pub async fn delete(
    db_thread_pool: web::Data<DbThreadPool>,
    session_user: SessionUser,
    entry_ids: web::Json<InputEntryIds>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let deleted_count = match web::block(move || {
        let wishlist_dao = db::wishlist::Dao::new(&db_thread_pool);
        wishlist_dao.delete_entries(session_user.user_id, &entry_ids.ids)
    })
    .await?
    {
        Ok(count) => count,
        Err(DaoError::CannotRunQuery(msg)) => {
            return Err(HttpErrorResponse::IncorrectlyFormed(msg.into()));
        }
        Err(DaoError::WontRunQuery) => {
            return Err(HttpErrorResponse::UserDisallowed(
                "cannot delete another user's wishlist entries".into(),
            ));
        }
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(HttpErrorResponse::DoesNotExist(
                "no matching wishlist entries".into(),
            ));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(
                "Failed to delete wishlist entries".into(),
            ));
        }
    };

    Ok(HttpResponse::Ok().json(OutputDeletedCount {
        deleted: deleted_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use serde_json::json;

    use wishlist_common::test_utils::TestDb;

    use crate::handlers::test_utils as handler_test_utils;

    async fn add_entry<S>(app: &S, cookie: &Cookie<'static>, body: serde_json::Value) -> i64
    where
        S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
    {
        let req = TestRequest::post()
            .uri("/api/wishlist")
            .cookie(cookie.clone())
            .set_json(body)
            .to_request();
        let resp = test::call_service(app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        handler_test_utils::read_json::<OutputId>(resp).await.id
    }

    #[actix_rt::test]
    async fn test_add_and_get_own_wishlist() {
        let db = TestDb::new();
        let app = handler_test_utils::init_app(db.pool()).await;

        let (jane, jane_cookie) =
            handler_test_utils::sign_up(&app, &db, "Jane", "Doe", "jane@example.com").await;

        let kite_id = add_entry(
            &app,
            &jane_cookie,
            json!({ "description": "Kite", "cost": "$20", "owner_notes": "red" }),
        )
        .await;
        let book_id = add_entry(&app, &jane_cookie, json!({ "description": "Book" })).await;
        assert!(book_id > kite_id);

        let req = TestRequest::post()
            .uri("/api/wishlist")
            .cookie(jane_cookie.clone())
            .set_json(json!({ "description": "  " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = TestRequest::get()
            .uri("/api/wishlist")
            .cookie(jane_cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let wishlist = handler_test_utils::read_json::<OutputWishlist>(resp).await;
        assert_eq!(wishlist.user, jane);
        assert!(!wishlist.headers.contains(&String::from("buyer_notes")));
        assert_eq!(wishlist.entries.len(), 2);
        assert_eq!(wishlist.entries[0].id, kite_id);
        assert_eq!(wishlist.entries[0].seq, 1);
        assert_eq!(wishlist.entries[0].cost, "$20");
        assert_eq!(wishlist.entries[0].owner_notes.as_deref(), Some("red"));
        assert_eq!(wishlist.entries[1].id, book_id);
        assert_eq!(wishlist.entries[1].source, "");
    }

    #[actix_rt::test]
    async fn test_owner_never_sees_buyer_notes_or_comments() {
        let db = TestDb::new();
        let app = handler_test_utils::init_app(db.pool()).await;

        let (jane, jane_cookie) =
            handler_test_utils::sign_up(&app, &db, "Jane", "Doe", "jane@example.com").await;
        let (john, john_cookie) =
            handler_test_utils::sign_up(&app, &db, "John", "Roe", "john@example.com").await;

        let entry_id = add_entry(&app, &jane_cookie, json!({ "description": "Kite" })).await;

        let req = TestRequest::patch()
            .uri("/api/wishlist")
            .cookie(john_cookie.clone())
            .set_json(json!({ "id": entry_id, "seq": 1, "buyer_notes": "bought it" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = TestRequest::post()
            .uri("/api/comments")
            .cookie(john_cookie.clone())
            .set_json(json!({ "wishlist_id": entry_id, "comment": "Got it!" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = TestRequest::get()
            .uri("/api/wishlist")
            .cookie(jane_cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = handler_test_utils::read_json::<serde_json::Value>(resp).await;
        for entry in body["entries"].as_array().unwrap() {
            assert!(entry["buyer_notes"].is_null());
            assert_eq!(entry["comments"], json!([]));
        }
        assert_eq!(body["entries"][0]["seq"], 2);

        let req = TestRequest::get()
            .uri(&format!("/api/wishlist?userId={}", jane.id))
            .cookie(john_cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let wishlist = handler_test_utils::read_json::<OutputWishlist>(resp).await;
        assert_eq!(wishlist.user, jane);
        assert!(wishlist.headers.contains(&String::from("buyer_notes")));
        assert_eq!(
            wishlist.entries[0].buyer_notes.as_deref(),
            Some("bought it")
        );
        assert_eq!(wishlist.entries[0].comments.len(), 1);
        assert_eq!(wishlist.entries[0].comments[0].comment, "Got it!");
        assert_eq!(wishlist.entries[0].comments[0].user, john);
    }

    #[actix_rt::test]
    async fn test_get_unknown_user_wishlist() {
        let db = TestDb::new();
        let app = handler_test_utils::init_app(db.pool()).await;

        let (_, cookie) =
            handler_test_utils::sign_up(&app, &db, "Jane", "Doe", "jane@example.com").await;

        let req = TestRequest::get()
            .uri("/api/wishlist?userId=9999")
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = TestRequest::get()
            .uri("/api/wishlist?userId=abc")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_patch_conflict() {
        let db = TestDb::new();
        let app = handler_test_utils::init_app(db.pool()).await;

        let (_, jane_cookie) =
            handler_test_utils::sign_up(&app, &db, "Jane", "Doe", "jane@example.com").await;
        let (_, john_cookie) =
            handler_test_utils::sign_up(&app, &db, "John", "Roe", "john@example.com").await;

        let entry_id = add_entry(&app, &jane_cookie, json!({ "description": "Kite" })).await;

        let req = TestRequest::patch()
            .uri("/api/wishlist")
            .cookie(jane_cookie)
            .set_json(json!({ "id": entry_id, "seq": 1, "description": "Blue kite" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let id_and_seq = handler_test_utils::read_json::<OutputIdAndSeq>(resp).await;
        assert_eq!(id_and_seq.id, entry_id);
        assert_eq!(id_and_seq.seq, 2);

        let req = TestRequest::patch()
            .uri("/api/wishlist")
            .cookie(john_cookie)
            .set_json(json!({ "id": entry_id, "seq": 1, "buyer_notes": "on it" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let body = handler_test_utils::read_json::<serde_json::Value>(resp).await;
        assert_eq!(body["client_seq"], 1);
        assert_eq!(body["current_seq"], 2);
    }

    #[actix_rt::test]
    async fn test_patch_clears_owner_notes() {
        let db = TestDb::new();
        let app = handler_test_utils::init_app(db.pool()).await;

        let (_, jane_cookie) =
            handler_test_utils::sign_up(&app, &db, "Jane", "Doe", "jane@example.com").await;

        let entry_id = add_entry(
            &app,
            &jane_cookie,
            json!({ "description": "Kite", "owner_notes": "red" }),
        )
        .await;

        let req = TestRequest::patch()
            .uri("/api/wishlist")
            .cookie(jane_cookie.clone())
            .set_json(json!({ "id": entry_id, "seq": 1, "owner_notes": null }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = TestRequest::get()
            .uri("/api/wishlist")
            .cookie(jane_cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let wishlist = handler_test_utils::read_json::<OutputWishlist>(resp).await;
        assert_eq!(wishlist.entries[0].seq, 2);
        assert_eq!(wishlist.entries[0].description, "Kite");
        assert_eq!(wishlist.entries[0].owner_notes, None);
    }

    #[actix_rt::test]
    async fn test_patch_field_permissions() {
        let db = TestDb::new();
        let app = handler_test_utils::init_app(db.pool()).await;

        let (_, jane_cookie) =
            handler_test_utils::sign_up(&app, &db, "Jane", "Doe", "jane@example.com").await;
        let (_, john_cookie) =
            handler_test_utils::sign_up(&app, &db, "John", "Roe", "john@example.com").await;

        let entry_id = add_entry(&app, &jane_cookie, json!({ "description": "Kite" })).await;

        let req = TestRequest::patch()
            .uri("/api/wishlist")
            .cookie(john_cookie.clone())
            .set_json(json!({ "id": entry_id, "seq": 1, "owner_notes": "sneaky" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = handler_test_utils::read_json::<serde_json::Value>(resp).await;
        assert_eq!(body["error"], "non-owner can only edit buyer notes");

        let req = TestRequest::patch()
            .uri("/api/wishlist")
            .cookie(jane_cookie.clone())
            .set_json(json!({ "id": entry_id, "seq": 1, "buyer_notes": "peek" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = handler_test_utils::read_json::<serde_json::Value>(resp).await;
        assert_eq!(body["error"], "owner cannot edit buyer notes");

        let req = TestRequest::patch()
            .uri("/api/wishlist")
            .cookie(jane_cookie.clone())
            .set_json(json!({ "id": entry_id, "seq": 1 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = TestRequest::patch()
            .uri("/api/wishlist")
            .cookie(jane_cookie.clone())
            .set_json(json!({ "id": 0, "seq": 1, "description": "Kite" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = TestRequest::patch()
            .uri("/api/wishlist")
            .cookie(jane_cookie)
            .set_json(json!({ "id": entry_id + 100, "seq": 1, "description": "Kite" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = TestRequest::patch()
            .uri("/api/wishlist")
            .set_json(json!({ "id": entry_id, "seq": 1, "buyer_notes": "anon" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_delete_entries() {
        let db = TestDb::new();
        let app = handler_test_utils::init_app(db.pool()).await;

        let (_, jane_cookie) =
            handler_test_utils::sign_up(&app, &db, "Jane", "Doe", "jane@example.com").await;
        let (_, john_cookie) =
            handler_test_utils::sign_up(&app, &db, "John", "Roe", "john@example.com").await;

        let kite_id = add_entry(&app, &jane_cookie, json!({ "description": "Kite" })).await;
        let book_id = add_entry(&app, &jane_cookie, json!({ "description": "Book" })).await;
        let ball_id = add_entry(&app, &john_cookie, json!({ "description": "Ball" })).await;

        // A single foreign ID means nothing gets deleted
        let req = TestRequest::delete()
            .uri("/api/wishlist")
            .cookie(jane_cookie.clone())
            .set_json(json!({ "ids": [kite_id, ball_id] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = TestRequest::delete()
            .uri("/api/wishlist")
            .cookie(jane_cookie.clone())
            .set_json(json!({ "ids": [] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = TestRequest::delete()
            .uri("/api/wishlist")
            .cookie(jane_cookie.clone())
            .set_json(json!({ "ids": [kite_id, book_id] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let deleted = handler_test_utils::read_json::<OutputDeletedCount>(resp).await;
        assert_eq!(deleted.deleted, 2);

        let req = TestRequest::delete()
            .uri("/api/wishlist")
            .cookie(jane_cookie)
            .set_json(json!({ "ids": [kite_id] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = TestRequest::get()
            .uri("/api/wishlist")
            .cookie(john_cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let wishlist = handler_test_utils::read_json::<OutputWishlist>(resp).await;
        assert_eq!(wishlist.entries.len(), 1);
        assert_eq!(wishlist.entries[0].id, ball_id);
    }

    #[test]
    fn test_buyer_view_groups_comments_by_entry() {
        let now = chrono::Utc::now().naive_utc();

        let entry = |id: i64| WishlistEntry {
            id,
            seq: 1,
            user_id: 1,
            description: format!("Entry {id}"),
            source: String::new(),
            cost: String::new(),
            owner_notes: None,
            buyer_notes: None,
            creation_time: now,
        };

        let comment = |id: i64, wishlist_id: i64| CommentWithAuthor {
            id,
            wishlist_id,
            user_id: 2,
            first_name: String::from("John"),
            last_name: String::from("Roe"),
            comment: format!("Comment {id}"),
            creation_time: now,
        };

        let view = build_buyer_view(
            vec![entry(1), entry(2), entry(3)],
            vec![comment(1, 2), comment(2, 1), comment(3, 2)],
        );

        assert_eq!(view.len(), 3);
        assert_eq!(
            view[0].comments.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![2]
        );
        assert_eq!(
            view[1].comments.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert!(view[2].comments.is_empty());
    }
}
