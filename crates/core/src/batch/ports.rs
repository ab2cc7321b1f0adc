//! Port interfaces for batch analysis

use async_trait::async_trait;
use chatcal_domain::{ChatCalError, ConversationId, FlushReason, InboundMessage, Result};

/// Downstream consumer of flushed batches (LLM extraction, webhook, ...).
#[async_trait]
pub trait BatchAnalyzer: Send + Sync {
    /// Analyze one flushed batch.
    ///
    /// `messages` are the batched messages in arrival order. `context` is the
    /// conversation's recent-message window at flush time, oldest first.
    /// Errors are logged by the scheduler and the batch is dropped.
    async fn analyze_conversation_batch(
        &self,
        conversation_id: &ConversationId,
        messages: &[InboundMessage],
        context: &[InboundMessage],
    ) -> Result<()>;
}

/// Hooks for flush and analysis outcomes. All methods default to no-ops.
pub trait BatchObserver: Send + Sync {
    /// A batch left the buffer and was handed to the analyzer.
    fn on_batch_flushed(&self, _conversation_id: &ConversationId, _size: usize, _reason: FlushReason) {}

    /// The analyzer accepted the batch.
    fn on_batch_analyzed(&self, _conversation_id: &ConversationId, _size: usize) {}

    /// The analyzer failed; the batch is gone.
    fn on_batch_dropped(&self, _conversation_id: &ConversationId, _size: usize, _error: &ChatCalError) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBatchObserver;

impl BatchObserver for NoopBatchObserver {}

/// Read access to a conversation's recent-message window.
pub trait ConversationContext: Send + Sync {
    /// Oldest first; empty for unknown conversations.
    fn recent_messages(&self, conversation_id: &ConversationId) -> Vec<InboundMessage>;
}
