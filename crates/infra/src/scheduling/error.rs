//! Scheduler error types

use chatcal_domain::ChatCalError;
use thiserror::Error;

use crate::errors::InfraError;

/// Scheduler lifecycle errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Scheduler already running")]
    AlreadyRunning,

    #[error("Scheduler not running")]
    NotRunning,

    /// Background task did not finish within the join timeout
    #[error("Operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Task join failed: {0}")]
    TaskJoinFailed(String),
}

impl From<tokio::task::JoinError> for SchedulerError {
    fn from(err: tokio::task::JoinError) -> Self {
        SchedulerError::TaskJoinFailed(err.to_string())
    }
}

impl From<SchedulerError> for InfraError {
    fn from(err: SchedulerError) -> Self {
        let chatcal_err = match err {
            SchedulerError::AlreadyRunning | SchedulerError::NotRunning => {
                ChatCalError::InvalidInput(err.to_string())
            }
            _ => ChatCalError::Internal(err.to_string()),
        };
        InfraError(chatcal_err)
    }
}

impl From<SchedulerError> for ChatCalError {
    fn from(err: SchedulerError) -> Self {
        InfraError::from(err).into()
    }
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
