//! Orchestration of classification, conversation state and batching

pub mod service;

pub use service::{ConversationTracker, ConversationTrackerBuilder};
