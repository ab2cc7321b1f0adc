//! Debounced batching of conversation messages for downstream analysis

pub mod ports;
pub mod scheduler;

pub use ports::{BatchAnalyzer, BatchObserver, ConversationContext, NoopBatchObserver};
pub use scheduler::{BatchScheduler, EnqueueOutcome};
