use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable};

use crate::models::user::User;
use crate::models::wishlist_entry::WishlistEntry;
use crate::schema::comments;

#[derive(Clone, Debug, Associations, Identifiable, Queryable)]
#[diesel(belongs_to(WishlistEntry, foreign_key = wishlist_id))]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Comment {
    pub id: i64,
    pub wishlist_id: i64,
    pub user_id: i64,

    pub comment: String,

    pub creation_time: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewComment<'a> {
    pub wishlist_id: i64,
    pub user_id: i64,

    pub comment: &'a str,

    pub creation_time: NaiveDateTime,
}
