use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable};

use crate::schema::invite_codes;

#[derive(Clone, Debug, Identifiable, Queryable)]
#[diesel(table_name = invite_codes, primary_key(code))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InviteCode {
    pub code: Vec<u8>,

    // Existing user the code is bound to, on whose behalf it was issued
    pub user_id: Option<i64>,

    pub creation_time: NaiveDateTime,
    pub expiry_time: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = invite_codes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewInviteCode<'a> {
    pub code: &'a [u8],
    pub user_id: Option<i64>,

    pub creation_time: NaiveDateTime,
    pub expiry_time: NaiveDateTime,
}
