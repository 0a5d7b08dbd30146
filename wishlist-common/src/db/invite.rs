use chrono::{NaiveDateTime, Utc};
use diesel::{dsl, ExpressionMethods, QueryDsl, RunQueryDsl};
use std::time::Duration;

use crate::db::{DaoError, DbThreadPool};
use crate::models::invite_code::NewInviteCode;
use crate::schema::invite_codes as invite_code_fields;
use crate::schema::invite_codes::dsl::invite_codes;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    /// Stores a new invite code and returns the time at which it expires. Invite codes are
    /// consumed by `user::Dao::create_user_with_invite_code()`.
    pub fn create_invite_code(
        &self,
        code: &[u8],
        bound_user_id: Option<i64>,
        lifetime: Duration,
    ) -> Result<NaiveDateTime, DaoError> {
        let lifetime = chrono::Duration::from_std(lifetime)
            .map_err(|_| DaoError::CannotRunQuery("Invite code lifetime is out of range"))?;

        let creation_time = Utc::now().naive_utc();
        let expiry_time = creation_time + lifetime;

        let new_invite_code = NewInviteCode {
            code,
            user_id: bound_user_id,
            creation_time,
            expiry_time,
        };

        dsl::insert_into(invite_codes)
            .values(&new_invite_code)
            .execute(&mut self.db_thread_pool.get()?)?;

        Ok(expiry_time)
    }

    pub fn delete_all_expired_invite_codes(&self) -> Result<usize, DaoError> {
        Ok(diesel::delete(
            invite_codes.filter(invite_code_fields::expiry_time.lt(Utc::now().naive_utc())),
        )
        .execute(&mut self.db_thread_pool.get()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::invite_code::InviteCode;
    use crate::test_utils::TestDb;
    use crate::token::OpaqueToken;

    #[test]
    fn test_create_invite_code() {
        let db = TestDb::new();
        let bound_user = db.insert_user("Jane", "Doe", "jane@example.com");
        let dao = Dao::new(db.pool());

        let code = OpaqueToken::generate();
        let expiry = dao
            .create_invite_code(code.as_bytes(), Some(bound_user), Duration::from_secs(3600))
            .unwrap();

        let stored = invite_codes
            .find(code.as_bytes())
            .get_result::<InviteCode>(&mut db.pool().get().unwrap())
            .unwrap();

        assert_eq!(stored.user_id, Some(bound_user));
        assert_eq!(stored.expiry_time, expiry);
        assert!(stored.creation_time < stored.expiry_time);
    }

    #[test]
    fn test_invite_code_bound_user_must_exist() {
        let db = TestDb::new();
        let dao = Dao::new(db.pool());

        let code = OpaqueToken::generate();
        let result = dao.create_invite_code(code.as_bytes(), Some(999), Duration::from_secs(60));

        assert!(matches!(
            result,
            Err(DaoError::QueryFailure(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::ForeignKeyViolation,
                _
            )))
        ));
    }

    #[test]
    fn test_delete_all_expired_invite_codes() {
        let db = TestDb::new();
        let dao = Dao::new(db.pool());

        let expired = OpaqueToken::generate();
        db.insert_expired_invite_code(expired.as_bytes());

        let live = OpaqueToken::generate();
        dao.create_invite_code(live.as_bytes(), None, Duration::from_secs(3600))
            .unwrap();

        assert_eq!(dao.delete_all_expired_invite_codes().unwrap(), 1);

        let remaining = invite_codes
            .select(invite_code_fields::code)
            .load::<Vec<u8>>(&mut db.pool().get().unwrap())
            .unwrap();

        assert_eq!(remaining, vec![live.as_bytes().to_vec()]);
    }
}
