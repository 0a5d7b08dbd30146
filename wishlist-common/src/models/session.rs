use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable};

use crate::models::user::User;
use crate::schema::sessions;

#[derive(Clone, Debug, Associations, Identifiable, Queryable)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(table_name = sessions, primary_key(session_cookie))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Session {
    pub session_cookie: Vec<u8>,
    pub user_id: i64,

    pub creation_time: NaiveDateTime,
    pub expiry_time: NaiveDateTime,

    pub user_agent: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewSession<'a> {
    pub session_cookie: &'a [u8],
    pub user_id: i64,

    pub creation_time: NaiveDateTime,
    pub expiry_time: NaiveDateTime,

    pub user_agent: &'a str,
}
