//! Fixtures shared by the DAO tests here and the handler and job tests in the other crates.
//! Every `TestDb` is a fresh migrated SQLite file in its own temporary directory.

use chrono::{Duration, Utc};
use diesel::{dsl, ExpressionMethods, QueryDsl, RunQueryDsl};
use std::time::Duration as StdDuration;
use tempfile::TempDir;

use crate::db::{self, DbThreadPool};
use crate::models::invite_code::NewInviteCode;
use crate::models::session::NewSession;
use crate::models::user::NewUser;
use crate::schema::invite_codes::dsl::invite_codes;
use crate::schema::sessions::dsl::sessions;
use crate::schema::users as user_fields;
use crate::schema::users::dsl::users;

/// Not a real hash of anything. Only usable where the hash is never verified.
pub const TEST_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=8,t=1,p=1$AAAAAAAAAAAAAAAAAAAAAA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

pub struct TestDb {
    pool: DbThreadPool,
    // Dropped after the pool so the directory outlives every connection
    _dir: TempDir,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let db_path = dir.path().join("wishlist-test.db");
        let db_path = db_path
            .to_str()
            .expect("Temporary directory path is not valid UTF-8");

        let pool = db::create_db_thread_pool(
            db_path,
            4,
            StdDuration::from_secs(30),
            StdDuration::from_secs(5),
        )
        .expect("Failed to create test DB thread pool");

        db::run_migrations(&pool).expect("Failed to run migrations on test DB");

        Self { pool, _dir: dir }
    }

    pub fn pool(&self) -> &DbThreadPool {
        &self.pool
    }

    pub fn insert_user(&self, first_name: &str, last_name: &str, email: &str) -> i64 {
        let new_user = NewUser {
            first_name,
            last_name,
            email,
            password_hash: TEST_PASSWORD_HASH,
            registration_time: Utc::now().naive_utc(),
        };

        dsl::insert_into(users)
            .values(&new_user)
            .returning(user_fields::id)
            .get_result::<i64>(&mut self.conn())
            .expect("Failed to insert test user")
    }

    pub fn set_password_hash(&self, user_id: i64, password_hash: &str) {
        dsl::update(users.find(user_id))
            .set(user_fields::password_hash.eq(password_hash))
            .execute(&mut self.conn())
            .expect("Failed to update test user's password hash");
    }

    pub fn insert_invite_code(&self, code: &[u8]) {
        let now = Utc::now().naive_utc();
        self.insert_invite_code_with_times(code, now, now + Duration::days(1));
    }

    pub fn insert_expired_invite_code(&self, code: &[u8]) {
        let now = Utc::now().naive_utc();
        self.insert_invite_code_with_times(code, now - Duration::days(2), now - Duration::days(1));
    }

    pub fn insert_session(&self, session_cookie: &[u8], user_id: i64) {
        let now = Utc::now().naive_utc();
        self.insert_session_with_times(session_cookie, user_id, now, now + Duration::days(1));
    }

    pub fn insert_expired_session(&self, session_cookie: &[u8], user_id: i64) {
        let now = Utc::now().naive_utc();
        self.insert_session_with_times(
            session_cookie,
            user_id,
            now - Duration::days(8),
            now - Duration::days(1),
        );
    }

    fn insert_invite_code_with_times(
        &self,
        code: &[u8],
        creation_time: chrono::NaiveDateTime,
        expiry_time: chrono::NaiveDateTime,
    ) {
        let new_invite_code = NewInviteCode {
            code,
            user_id: None,
            creation_time,
            expiry_time,
        };

        dsl::insert_into(invite_codes)
            .values(&new_invite_code)
            .execute(&mut self.conn())
            .expect("Failed to insert test invite code");
    }

    fn insert_session_with_times(
        &self,
        session_cookie: &[u8],
        user_id: i64,
        creation_time: chrono::NaiveDateTime,
        expiry_time: chrono::NaiveDateTime,
    ) {
        let new_session = NewSession {
            session_cookie,
            user_id,
            creation_time,
            expiry_time,
            user_agent: "test",
        };

        dsl::insert_into(sessions)
            .values(&new_session)
            .execute(&mut self.conn())
            .expect("Failed to insert test session");
    }

    fn conn(&self) -> db::DbConnection {
        self.pool
            .get()
            .expect("Failed to obtain pooled DB connection for tests")
    }
}

impl Default for TestDb {
    fn default() -> Self {
        Self::new()
    }
}
