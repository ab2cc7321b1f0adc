//! Shared test helpers for `chatcal-core` integration tests.

#![allow(dead_code)]

pub mod analyzers;

pub use analyzers::{AnalyzedBatch, CountingObserver, RecordingAnalyzer};
