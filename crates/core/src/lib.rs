//! # ChatCal Core
//!
//! Pure business logic of the message triage pipeline - no HTTP, storage or
//! process plumbing.
//!
//! This crate contains:
//! - The heuristic relevance classifier
//! - Per-conversation hot/cold calendar context tracking
//! - The debounced per-conversation batch scheduler
//! - The conversation tracker that ties them together
//! - Port traits for the analysis collaborator and flush observers
//!
//! ## Architecture Principles
//! - Only depends on `chatcal-domain` and `chatcal-common`
//! - Downstream analysis is reached through [`BatchAnalyzer`]
//! - Ingestion is synchronous; analysis runs on the ambient tokio runtime

pub mod batch;
pub mod conversation;
pub mod tracker;
pub mod triage;

pub use batch::{
    BatchAnalyzer, BatchObserver, BatchScheduler, ConversationContext, EnqueueOutcome,
    NoopBatchObserver,
};
pub use conversation::{ConversationState, ConversationStore};
pub use tracker::{ConversationTracker, ConversationTrackerBuilder};
pub use triage::{HeuristicClassifier, MessageClassifier};
