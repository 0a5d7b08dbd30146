use chrono::{NaiveDateTime, Utc};
use diesel::{dsl, ExpressionMethods, QueryDsl, RunQueryDsl};
use std::time::Duration;

use crate::db::{DaoError, DbThreadPool};
use crate::models::session::NewSession;
use crate::schema::sessions as session_fields;
use crate::schema::sessions::dsl::sessions;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    /// Stores a new session and returns the time at which it expires.
    pub fn create_session(
        &self,
        session_cookie: &[u8],
        user_id: i64,
        user_agent: &str,
        lifetime: Duration,
    ) -> Result<NaiveDateTime, DaoError> {
        let lifetime = chrono::Duration::from_std(lifetime)
            .map_err(|_| DaoError::CannotRunQuery("Session lifetime is out of range"))?;

        let creation_time = Utc::now().naive_utc();
        let expiry_time = creation_time + lifetime;

        let new_session = NewSession {
            session_cookie,
            user_id,
            creation_time,
            expiry_time,
            user_agent,
        };

        dsl::insert_into(sessions)
            .values(&new_session)
            .execute(&mut self.db_thread_pool.get()?)?;

        Ok(expiry_time)
    }

    /// Returns the owning user's ID and the expiry time of the session. Expired sessions are
    /// returned as well; it is up to the caller to reject them.
    pub fn get_session_user(&self, session_cookie: &[u8]) -> Result<(i64, NaiveDateTime), DaoError> {
        Ok(sessions
            .select((session_fields::user_id, session_fields::expiry_time))
            .find(session_cookie)
            .get_result::<(i64, NaiveDateTime)>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn delete_session(&self, session_cookie: &[u8]) -> Result<usize, DaoError> {
        Ok(diesel::delete(sessions.find(session_cookie))
            .execute(&mut self.db_thread_pool.get()?)?)
    }

    pub fn delete_all_expired_sessions(&self) -> Result<usize, DaoError> {
        Ok(
            diesel::delete(sessions.filter(session_fields::expiry_time.lt(Utc::now().naive_utc())))
                .execute(&mut self.db_thread_pool.get()?)?,
        )
    }
}
