//! Recording analyzer and counting observer mocks

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chatcal_core::{BatchAnalyzer, BatchObserver};
use chatcal_domain::{ChatCalError, ConversationId, FlushReason, InboundMessage, Result};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// One analyzer invocation as seen by [`RecordingAnalyzer`].
#[derive(Debug, Clone)]
pub struct AnalyzedBatch {
    pub conversation_id: ConversationId,
    pub messages: Vec<InboundMessage>,
    pub context: Vec<InboundMessage>,
    /// Tokio (possibly paused) time of the call.
    pub at: Instant,
}

impl AnalyzedBatch {
    pub fn texts(&self) -> Vec<&str> {
        self.messages.iter().map(|message| message.text.as_str()).collect()
    }
}

/// Forwards every batch over a channel and optionally fails afterwards.
pub struct RecordingAnalyzer {
    tx: mpsc::UnboundedSender<AnalyzedBatch>,
    failure: Option<ChatCalError>,
}

impl RecordingAnalyzer {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<AnalyzedBatch>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx, failure: None }), rx)
    }

    pub fn failing(error: ChatCalError) -> (Arc<Self>, mpsc::UnboundedReceiver<AnalyzedBatch>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx, failure: Some(error) }), rx)
    }
}

#[async_trait]
impl BatchAnalyzer for RecordingAnalyzer {
    async fn analyze_conversation_batch(
        &self,
        conversation_id: &ConversationId,
        messages: &[InboundMessage],
        context: &[InboundMessage],
    ) -> Result<()> {
        let _ = self.tx.send(AnalyzedBatch {
            conversation_id: conversation_id.clone(),
            messages: messages.to_vec(),
            context: context.to_vec(),
            at: Instant::now(),
        });
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// Counts observer callbacks and remembers flush reasons in order.
#[derive(Default)]
pub struct CountingObserver {
    analyzed: AtomicUsize,
    dropped: AtomicUsize,
    reasons: Mutex<Vec<FlushReason>>,
    errors: Mutex<Vec<ChatCalError>>,
}

impl CountingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reasons(&self) -> Vec<FlushReason> {
        self.reasons.lock().clone()
    }

    pub fn analyzed(&self) -> usize {
        self.analyzed.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> Vec<ChatCalError> {
        self.errors.lock().clone()
    }
}

impl BatchObserver for CountingObserver {
    fn on_batch_flushed(&self, _conversation_id: &ConversationId, _size: usize, reason: FlushReason) {
        self.reasons.lock().push(reason);
    }

    fn on_batch_analyzed(&self, _conversation_id: &ConversationId, _size: usize) {
        self.analyzed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_batch_dropped(&self, _conversation_id: &ConversationId, _size: usize, error: &ChatCalError) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
        self.errors.lock().push(error.clone());
    }
}
