//! Per-message calendar relevance triage

pub mod classifier;
pub mod patterns;

pub use classifier::{HeuristicClassifier, MessageClassifier};
