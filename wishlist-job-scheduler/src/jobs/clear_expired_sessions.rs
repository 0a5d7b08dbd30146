use wishlist_common::db::session::Dao as SessionDao;
use wishlist_common::db::DbThreadPool;

use async_trait::async_trait;

use crate::jobs::{Job, JobError};

pub struct ClearExpiredSessionsJob {
    db_thread_pool: DbThreadPool,
    is_running: bool,
}

impl ClearExpiredSessionsJob {
    pub fn new(db_thread_pool: DbThreadPool) -> Self {
        Self {
            db_thread_pool,
            is_running: false,
        }
    }
}

#[async_trait]
impl Job for ClearExpiredSessionsJob {
    fn name(&self) -> &'static str {
        "Clear Expired Sessions"
    }

    fn is_ready(&self) -> bool {
        !self.is_running
    }

    async fn execute(&mut self) -> Result<(), JobError> {
        self.is_running = true;

        let dao = SessionDao::new(&self.db_thread_pool);
        let result = tokio::task::spawn_blocking(move || dao.delete_all_expired_sessions()).await;

        self.is_running = false;

        let deleted_count = result??;
        log::info!("Deleted {deleted_count} expired session(s)");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wishlist_common::schema::sessions;
    use wishlist_common::test_utils::TestDb;
    use wishlist_common::token::OpaqueToken;

    use diesel::{QueryDsl, RunQueryDsl};

    #[tokio::test]
    async fn test_execute() {
        let db = TestDb::new();
        let user_id = db.insert_user("Jane", "Doe", "jane@example.com");

        let expired_token = OpaqueToken::generate();
        let live_token = OpaqueToken::generate();

        db.insert_expired_session(expired_token.as_bytes(), user_id);
        db.insert_session(live_token.as_bytes(), user_id);

        let mut job = ClearExpiredSessionsJob::new(db.pool().clone());
        assert!(job.is_ready());

        job.execute().await.unwrap();
        assert!(job.is_ready());

        let mut conn = db.pool().get().unwrap();

        assert_eq!(
            sessions::table
                .find(expired_token.as_bytes())
                .count()
                .get_result::<i64>(&mut conn)
                .unwrap(),
            0
        );

        assert_eq!(
            sessions::table
                .find(live_token.as_bytes())
                .count()
                .get_result::<i64>(&mut conn)
                .unwrap(),
            1
        );
    }
}
