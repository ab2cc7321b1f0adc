//! # ChatCal Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The webhook batch analyzer and its HTTP client
//! - Configuration loading from environment variables and files
//! - The periodic conversation cleanup scheduler
//! - Batch metrics and tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `chatcal-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod observability;
pub mod scheduling;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::HttpClient;
pub use integrations::{LoggingBatchAnalyzer, WebhookBatchAnalyzer};
pub use observability::{init_tracing, MetricsSnapshot, TriageMetrics};
pub use scheduling::{CleanupScheduler, SchedulerError};
