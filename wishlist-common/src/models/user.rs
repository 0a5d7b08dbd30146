use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable, QueryableByName};

use crate::schema::users;

#[derive(Clone, Debug, Identifiable, Queryable, QueryableByName)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i64,

    pub first_name: String,
    pub last_name: String,
    pub email: String,

    pub password_hash: String,

    pub registration_time: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewUser<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,

    pub password_hash: &'a str,

    pub registration_time: NaiveDateTime,
}
