//! Conversation tracker - ingestion entry point of the triage pipeline

use std::sync::Arc;
use std::time::Duration;

use chatcal_common::time::{Clock, SystemClock};
use chatcal_domain::{ConversationId, ConversationSnapshot, InboundMessage, TriageConfig};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::batch::{BatchAnalyzer, BatchObserver, BatchScheduler, NoopBatchObserver};
use crate::conversation::ConversationStore;
use crate::triage::{HeuristicClassifier, MessageClassifier};

/// Owns conversation state and batch buffers, and runs each inbound message
/// through classification, the state transition and the batch scheduler.
///
/// All methods are synchronous. Batch analysis runs on the ambient tokio
/// runtime.
pub struct ConversationTracker {
    store: Arc<ConversationStore>,
    scheduler: BatchScheduler,
    classifier: Arc<dyn MessageClassifier>,
    clock: Arc<dyn Clock>,
    config: TriageConfig,
    /// Serializes ingestion and eviction so one message's state update and
    /// enqueue are never interleaved with another's.
    ingest: Mutex<()>,
}

impl ConversationTracker {
    /// Tracker with the heuristic classifier, no observer, the system clock
    /// and default timings.
    pub fn new(analyzer: Arc<dyn BatchAnalyzer>) -> Self {
        Self::builder(analyzer).build()
    }

    pub fn builder(analyzer: Arc<dyn BatchAnalyzer>) -> ConversationTrackerBuilder {
        ConversationTrackerBuilder::new(analyzer)
    }

    /// Ingest a message. `timestamp` defaults to the tracker clock's now.
    pub fn add_message(
        &self,
        conversation_id: &ConversationId,
        text: &str,
        sender: &str,
        timestamp: Option<i64>,
    ) -> ConversationSnapshot {
        let timestamp = timestamp.unwrap_or_else(|| self.clock.now_millis());
        self.add_inbound(conversation_id, InboundMessage::new(text, sender, timestamp))
    }

    /// Ingest an already-built message.
    pub fn add_inbound(
        &self,
        conversation_id: &ConversationId,
        message: InboundMessage,
    ) -> ConversationSnapshot {
        let _ingest = self.ingest.lock();

        let verdict = self.classifier.classify(&message.text);
        let (previous, snapshot) =
            self.store.record(conversation_id, message.clone(), &verdict, &self.config);

        if previous != snapshot.phase {
            info!(
                conversation_id = %conversation_id,
                from = %previous,
                to = %snapshot.phase,
                "Calendar context changed"
            );
        }

        let outcome = self.scheduler.add_message(conversation_id, message);
        debug!(
            conversation_id = %conversation_id,
            relevant = verdict.relevant,
            score = verdict.score,
            outcome = ?outcome,
            "Message ingested"
        );

        snapshot
    }

    /// Whether the conversation is worth sending to the analyzer right now.
    /// Unknown conversations are not.
    pub fn should_analyze_conversation(&self, conversation_id: &ConversationId) -> bool {
        self.store.should_analyze(conversation_id, self.clock.now_millis(), &self.config)
    }

    /// Evict conversations idle longer than the eviction window, cancelling
    /// their timers and discarding pending messages. Returns how many were
    /// removed.
    pub fn cleanup_old_conversations(&self) -> usize {
        let _ingest = self.ingest.lock();

        let now = self.clock.now_millis();
        let evicted = self.store.evict_stale(now, self.config.eviction_after_ms);
        for conversation_id in &evicted {
            self.scheduler.evict(conversation_id);
        }

        if !evicted.is_empty() {
            info!(
                evicted = evicted.len(),
                remaining = self.store.len(),
                "Evicted stale conversations"
            );
        }
        evicted.len()
    }

    pub fn conversation(&self, conversation_id: &ConversationId) -> Option<ConversationSnapshot> {
        self.store.snapshot(conversation_id)
    }

    /// Messages waiting in the conversation's batch buffer.
    pub fn pending_len(&self, conversation_id: &ConversationId) -> usize {
        self.scheduler.pending_len(conversation_id)
    }

    pub fn conversation_count(&self) -> usize {
        self.store.len()
    }

    /// Batches handed to the analyzer whose call has not finished yet.
    pub fn in_flight_batches(&self) -> usize {
        self.scheduler.in_flight()
    }

    /// Wait up to `timeout` for in-flight analyzer calls. Returns whether
    /// they all finished.
    pub async fn drain_in_flight(&self, timeout: Duration) -> bool {
        self.scheduler.drain(timeout).await
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }
}

impl std::fmt::Debug for ConversationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationTracker")
            .field("conversations", &self.store.len())
            .field("scheduler", &self.scheduler)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ConversationTracker`].
pub struct ConversationTrackerBuilder {
    analyzer: Arc<dyn BatchAnalyzer>,
    classifier: Arc<dyn MessageClassifier>,
    observer: Arc<dyn BatchObserver>,
    clock: Arc<dyn Clock>,
    config: TriageConfig,
}

impl ConversationTrackerBuilder {
    fn new(analyzer: Arc<dyn BatchAnalyzer>) -> Self {
        Self {
            analyzer,
            classifier: Arc::new(HeuristicClassifier::new()),
            observer: Arc::new(NoopBatchObserver),
            clock: Arc::new(SystemClock),
            config: TriageConfig::default(),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn MessageClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn BatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Clock for default timestamps, activity checks and eviction.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: TriageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> ConversationTracker {
        let store = Arc::new(ConversationStore::new(self.config.context_window));
        let scheduler = BatchScheduler::new(self.analyzer, store.clone(), &self.config)
            .with_observer(self.observer)
            .with_clock(self.clock.clone());

        ConversationTracker {
            store,
            scheduler,
            classifier: self.classifier,
            clock: self.clock,
            config: self.config,
            ingest: Mutex::new(()),
        }
    }
}
