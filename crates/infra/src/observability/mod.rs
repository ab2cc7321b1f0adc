//! Observability: batch metrics and tracing subscriber setup

pub mod logging;
pub mod metrics;

pub use logging::init_tracing;
pub use metrics::{MetricsSnapshot, TriageMetrics};
