use chrono::{NaiveDateTime, Utc};
use diesel::{dsl, ExpressionMethods, JoinOnDsl, QueryDsl, Queryable, RunQueryDsl};

use crate::db::{DaoError, DbThreadPool};
use crate::models::comment::NewComment;
use crate::schema::comments as comment_fields;
use crate::schema::comments::dsl::comments;
use crate::schema::users as user_fields;
use crate::schema::users::dsl::users;
use crate::schema::wishlist as wishlist_fields;
use crate::schema::wishlist::dsl::wishlist;

#[derive(Clone, Debug, Queryable)]
pub struct CommentWithAuthor {
    pub id: i64,
    pub wishlist_id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub comment: String,
    pub creation_time: NaiveDateTime,
}

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    /// Attaches a comment to a wishlist entry. Owners can't comment on their own entries; an
    /// attempt to do so returns `DaoError::WontRunQuery`.
    pub fn create_comment(
        &self,
        wishlist_id: i64,
        user_id: i64,
        comment: &str,
    ) -> Result<i64, DaoError> {
        let new_comment = NewComment {
            wishlist_id,
            user_id,
            comment,
            creation_time: Utc::now().naive_utc(),
        };

        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.immediate_transaction::<_, DaoError, _>(|conn| {
            let owner_id = wishlist
                .select(wishlist_fields::user_id)
                .find(wishlist_id)
                .get_result::<i64>(conn)?;

            if owner_id == user_id {
                return Err(DaoError::WontRunQuery);
            }

            Ok(dsl::insert_into(comments)
                .values(&new_comment)
                .returning(comment_fields::id)
                .get_result::<i64>(conn)?)
        })
    }

    /// Deletes a comment if `user_id` is its author. Returns the number of deleted rows, which
    /// is zero when the comment doesn't exist or belongs to someone else.
    pub fn delete_comment(&self, comment_id: i64, user_id: i64) -> Result<usize, DaoError> {
        Ok(diesel::delete(
            comments
                .filter(comment_fields::id.eq(comment_id))
                .filter(comment_fields::user_id.eq(user_id)),
        )
        .execute(&mut self.db_thread_pool.get()?)?)
    }

    /// Every comment on the given user's wishlist, oldest first.
    pub fn get_comments_for_wishlist_owner(
        &self,
        owner_id: i64,
    ) -> Result<Vec<CommentWithAuthor>, DaoError> {
        Ok(comments
            .inner_join(wishlist.on(wishlist_fields::id.eq(comment_fields::wishlist_id)))
            .inner_join(users.on(user_fields::id.eq(comment_fields::user_id)))
            .filter(wishlist_fields::user_id.eq(owner_id))
            .select((
                comment_fields::id,
                comment_fields::wishlist_id,
                comment_fields::user_id,
                user_fields::first_name,
                user_fields::last_name,
                comment_fields::comment,
                comment_fields::creation_time,
            ))
            .order(comment_fields::id.asc())
            .load::<CommentWithAuthor>(&mut self.db_thread_pool.get()?)?)
    }
}
