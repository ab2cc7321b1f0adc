//! Implementations of the batch analysis port

pub mod dry_run;
pub mod webhook;

pub use dry_run::LoggingBatchAnalyzer;
pub use webhook::{BatchPayload, WebhookBatchAnalyzer};
