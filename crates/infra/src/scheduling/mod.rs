//! Background schedulers

pub mod cleanup_scheduler;
pub mod error;

pub use cleanup_scheduler::CleanupScheduler;
pub use error::{SchedulerError, SchedulerResult};
