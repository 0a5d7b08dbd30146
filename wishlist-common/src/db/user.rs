use chrono::Utc;
use diesel::{dsl, ExpressionMethods, QueryDsl, Queryable, RunQueryDsl};

use crate::db::{DaoError, DbThreadPool};
use crate::models::user::NewUser;
use crate::schema::invite_codes as invite_code_fields;
use crate::schema::invite_codes::dsl::invite_codes;
use crate::schema::users as user_fields;
use crate::schema::users::dsl::users;

#[derive(Clone, Debug, PartialEq, Eq, Queryable)]
pub struct UserIdAndName {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Queryable)]
pub struct UserCredentials {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
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

    /// Consumes `invite_code` and creates the user in the same transaction. If the code is
    /// unknown, already used, or expired, nothing is written and
    /// `DaoError::CannotRunQuery` is returned. If the user can't be inserted (e.g. the email is
    /// taken), the code is left unconsumed.
    pub fn create_user_with_invite_code(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
        invite_code: &[u8],
    ) -> Result<i64, DaoError> {
        let current_time = Utc::now().naive_utc();
        let email_lowercase = email.to_lowercase();

        let new_user = NewUser {
            first_name,
            last_name,
            email: &email_lowercase,
            password_hash,
            registration_time: current_time,
        };

        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.immediate_transaction::<_, DaoError, _>(|conn| {
            let consumed_code_count = diesel::delete(
                invite_codes
                    .filter(invite_code_fields::code.eq(invite_code))
                    .filter(invite_code_fields::expiry_time.ge(current_time)),
            )
            .execute(conn)?;

            if consumed_code_count == 0 {
                return Err(DaoError::CannotRunQuery("Invite code is invalid"));
            }

            let user_id = dsl::insert_into(users)
                .values(&new_user)
                .returning(user_fields::id)
                .get_result::<i64>(conn)?;

            Ok(user_id)
        })
    }

    pub fn get_user_credentials(&self, user_email: &str) -> Result<UserCredentials, DaoError> {
        Ok(users
            .select((
                user_fields::id,
                user_fields::first_name,
                user_fields::last_name,
                user_fields::password_hash,
            ))
            .filter(user_fields::email.eq(user_email.to_lowercase()))
            .get_result::<UserCredentials>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn get_user_id_and_name(&self, user_id: i64) -> Result<UserIdAndName, DaoError> {
        Ok(users
            .select((
                user_fields::id,
                user_fields::first_name,
                user_fields::last_name,
            ))
            .find(user_id)
            .get_result::<UserIdAndName>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn get_all_users(&self) -> Result<Vec<UserIdAndName>, DaoError> {
        Ok(users
            .select((
                user_fields::id,
                user_fields::first_name,
                user_fields::last_name,
            ))
            .order(user_fields::id.asc())
            .load::<UserIdAndName>(&mut self.db_thread_pool.get()?)?)
    }
}
