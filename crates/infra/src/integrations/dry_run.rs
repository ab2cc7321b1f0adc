//! Analyzer that only logs flushed batches

use async_trait::async_trait;
use chatcal_core::BatchAnalyzer;
use chatcal_domain::utils::text::preview;
use chatcal_domain::{ConversationId, InboundMessage, Result};
use tracing::info;

/// Stand-in used when the analysis webhook is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingBatchAnalyzer;

#[async_trait]
impl BatchAnalyzer for LoggingBatchAnalyzer {
    async fn analyze_conversation_batch(
        &self,
        conversation_id: &ConversationId,
        messages: &[InboundMessage],
        context: &[InboundMessage],
    ) -> Result<()> {
        let newest = messages.last().map(|message| preview(&message.text)).unwrap_or_default();
        info!(
            conversation_id = %conversation_id,
            batch_size = messages.len(),
            context_size = context.len(),
            newest = %newest,
            "Analyzer disabled; batch logged only"
        );
        Ok(())
    }
}
