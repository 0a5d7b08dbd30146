use wishlist_common::db::invite::Dao as InviteDao;
use wishlist_common::db::DbThreadPool;

use async_trait::async_trait;

use crate::jobs::{Job, JobError};

pub struct ClearExpiredInviteCodesJob {
    db_thread_pool: DbThreadPool,
    is_running: bool,
}

impl ClearExpiredInviteCodesJob {
    pub fn new(db_thread_pool: DbThreadPool) -> Self {
        Self {
            db_thread_pool,
            is_running: false,
        }
    }
}

#[async_trait]
impl Job for ClearExpiredInviteCodesJob {
    fn name(&self) -> &'static str {
        "Clear Expired Invite Codes"
    }

    fn is_ready(&self) -> bool {
        !self.is_running
    }

    async fn execute(&mut self) -> Result<(), JobError> {
        self.is_running = true;

        let dao = InviteDao::new(&self.db_thread_pool);
        let result =
            tokio::task::spawn_blocking(move || dao.delete_all_expired_invite_codes()).await;

        self.is_running = false;

        let deleted_count = result??;
        log::info!("Deleted {deleted_count} expired invite code(s)");

        Ok(())
    }
}
