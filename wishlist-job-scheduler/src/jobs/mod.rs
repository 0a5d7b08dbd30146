mod clear_expired_invite_codes;
mod clear_expired_sessions;

pub use clear_expired_invite_codes::ClearExpiredInviteCodesJob;
pub use clear_expired_sessions::ClearExpiredSessionsJob;

use wishlist_common::db::DaoError;

use async_trait::async_trait;
use std::fmt;
use tokio::task::JoinError;

#[derive(Debug)]
pub enum JobError {
    DaoFailure(Option<DaoError>),
    ConcurrencyError(JoinError),
    NotReady,
}

impl std::error::Error for JobError {}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::DaoFailure(e) => {
                if let Some(inner_err) = e {
                    write!(f, "JobError: {inner_err}")
                } else {
                    write!(f, "JobError: DaoFailure")
                }
            }
            JobError::ConcurrencyError(e) => {
                write!(f, "JobError: ConcurrencyError: {e}")
            }
            JobError::NotReady => {
                write!(f, "JobError: Attempted execution before job was ready")
            }
        }
    }
}

impl From<DaoError> for JobError {
    fn from(e: DaoError) -> Self {
        JobError::DaoFailure(Some(e))
    }
}

impl From<JoinError> for JobError {
    fn from(e: JoinError) -> Self {
        JobError::ConcurrencyError(e)
    }
}

#[async_trait]
pub trait Job: Send {
    fn name(&self) -> &'static str;
    fn is_ready(&self) -> bool;
    async fn execute(&mut self) -> Result<(), JobError>;
}
