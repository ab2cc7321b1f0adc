//! Batch pipeline metrics collected through the flush observer hook
//!
//! ## Design
//! - Plain atomic counters; `Relaxed` ordering since no value is derived
//!   from two counters at once
//! - Recent drop errors kept in a bounded ring buffer for diagnostics
//! - [`TriageMetrics::snapshot`] returns a serializable point-in-time copy

use std::sync::atomic::{AtomicU64, Ordering};

use chatcal_common::collections::RingBuffer;
use chatcal_core::BatchObserver;
use chatcal_domain::{ChatCalError, ConversationId, FlushReason};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::warn;

const RECENT_ERROR_CAPACITY: usize = 20;

/// Counters for flushed, analyzed and dropped batches.
#[derive(Debug)]
pub struct TriageMetrics {
    flushed_batch_full: AtomicU64,
    flushed_priority: AtomicU64,
    flushed_timer: AtomicU64,
    messages_flushed: AtomicU64,
    batches_analyzed: AtomicU64,
    batches_dropped: AtomicU64,
    messages_dropped: AtomicU64,
    conversations_evicted: AtomicU64,
    recent_errors: Mutex<RingBuffer<String>>,
}

/// Point-in-time copy of [`TriageMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub flushed_batch_full: u64,
    pub flushed_priority: u64,
    pub flushed_timer: u64,
    pub messages_flushed: u64,
    pub batches_analyzed: u64,
    pub batches_dropped: u64,
    pub messages_dropped: u64,
    pub conversations_evicted: u64,
    /// Oldest first.
    pub recent_errors: Vec<String>,
}

impl MetricsSnapshot {
    pub fn batches_flushed(&self) -> u64 {
        self.flushed_batch_full + self.flushed_priority + self.flushed_timer
    }
}

impl Default for TriageMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TriageMetrics {
    pub fn new() -> Self {
        Self {
            flushed_batch_full: AtomicU64::new(0),
            flushed_priority: AtomicU64::new(0),
            flushed_timer: AtomicU64::new(0),
            messages_flushed: AtomicU64::new(0),
            batches_analyzed: AtomicU64::new(0),
            batches_dropped: AtomicU64::new(0),
            messages_dropped: AtomicU64::new(0),
            conversations_evicted: AtomicU64::new(0),
            recent_errors: Mutex::new(RingBuffer::new(RECENT_ERROR_CAPACITY)),
        }
    }

    /// Record conversations removed by an eviction sweep.
    pub fn record_evictions(&self, count: usize) {
        self.conversations_evicted.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            flushed_batch_full: self.flushed_batch_full.load(Ordering::Relaxed),
            flushed_priority: self.flushed_priority.load(Ordering::Relaxed),
            flushed_timer: self.flushed_timer.load(Ordering::Relaxed),
            messages_flushed: self.messages_flushed.load(Ordering::Relaxed),
            batches_analyzed: self.batches_analyzed.load(Ordering::Relaxed),
            batches_dropped: self.batches_dropped.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            conversations_evicted: self.conversations_evicted.load(Ordering::Relaxed),
            recent_errors: self.recent_errors.lock().to_vec(),
        }
    }
}

impl BatchObserver for TriageMetrics {
    fn on_batch_flushed(&self, _conversation_id: &ConversationId, size: usize, reason: FlushReason) {
        let counter = match reason {
            FlushReason::BatchFull => &self.flushed_batch_full,
            FlushReason::Priority => &self.flushed_priority,
            FlushReason::Timer => &self.flushed_timer,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.messages_flushed.fetch_add(size as u64, Ordering::Relaxed);
    }

    fn on_batch_analyzed(&self, _conversation_id: &ConversationId, _size: usize) {
        self.batches_analyzed.fetch_add(1, Ordering::Relaxed);
    }

    fn on_batch_dropped(&self, conversation_id: &ConversationId, size: usize, error: &ChatCalError) {
        let dropped = self.batches_dropped.fetch_add(1, Ordering::Relaxed) + 1;
        self.messages_dropped.fetch_add(size as u64, Ordering::Relaxed);
        self.recent_errors.lock().push(format!("{}: {error}", error.label()));
        warn!(
            conversation_id = %conversation_id,
            batch_size = size,
            error_kind = error.label(),
            total_dropped = dropped,
            "Batch dropped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_flushes_by_reason() {
        let metrics = TriageMetrics::new();
        let id = ConversationId::new("chat");

        metrics.on_batch_flushed(&id, 10, FlushReason::BatchFull);
        metrics.on_batch_flushed(&id, 2, FlushReason::Priority);
        metrics.on_batch_flushed(&id, 3, FlushReason::Timer);
        metrics.on_batch_flushed(&id, 1, FlushReason::Timer);
        metrics.on_batch_analyzed(&id, 10);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.batches_flushed(), 4);
        assert_eq!(snapshot.flushed_timer, 2);
        assert_eq!(snapshot.messages_flushed, 16);
        assert_eq!(snapshot.batches_analyzed, 1);
    }

    #[test]
    fn drops_keep_bounded_error_history() {
        let metrics = TriageMetrics::new();
        let id = ConversationId::new("chat");

        for i in 0..25 {
            metrics.on_batch_dropped(&id, 2, &ChatCalError::Network(format!("HTTP 50{}", i % 10)));
        }
        metrics.record_evictions(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.batches_dropped, 25);
        assert_eq!(snapshot.messages_dropped, 50);
        assert_eq!(snapshot.conversations_evicted, 3);
        assert_eq!(snapshot.recent_errors.len(), 20);
        assert_eq!(snapshot.recent_errors.last().map(String::as_str), Some("network: Network error: HTTP 504"));
    }

    #[test]
    fn snapshot_serializes() {
        let json = serde_json::to_value(TriageMetrics::new().snapshot()).unwrap();
        assert_eq!(json["batches_dropped"], 0);
        assert!(json["recent_errors"].as_array().is_some_and(Vec::is_empty));
    }
}
