use std::sync::Arc;

use async_trait::async_trait;
use chatcal_core::{BatchAnalyzer, HeuristicClassifier, MessageClassifier};
use chatcal_domain::{
    AnalyzerConfig, ChatCalError, ConversationId, InboundMessage, MessageHints, Result,
};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::types::BatchPayload;
use crate::http::HttpClient;

/// Sends each flushed batch to an external workflow endpoint as JSON.
pub struct WebhookBatchAnalyzer {
    http_client: HttpClient,
    webhook_url: String,
    classifier: Arc<dyn MessageClassifier>,
}

impl WebhookBatchAnalyzer {
    pub fn new(webhook_url: impl Into<String>, http_client: HttpClient) -> Self {
        Self {
            http_client,
            webhook_url: webhook_url.into(),
            classifier: Arc::new(HeuristicClassifier::new()),
        }
    }

    /// Build from analyzer settings.
    ///
    /// # Errors
    /// `ChatCalError::Config` when no webhook URL is configured or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        let webhook_url = config
            .webhook_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ChatCalError::Config("analyzer webhook_url is not set".into()))?;

        let http_client = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .max_attempts(config.max_attempts)
            .build()?;

        Ok(Self::new(webhook_url, http_client))
    }

    /// Classifier used to extract payload hints.
    pub fn with_classifier(mut self, classifier: Arc<dyn MessageClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    fn build_payload(
        &self,
        conversation_id: &ConversationId,
        messages: &[InboundMessage],
        context: &[InboundMessage],
    ) -> BatchPayload {
        let mut hints = MessageHints::default();
        for message in messages {
            hints.merge(self.classifier.extract_hints(&message.text));
        }

        BatchPayload {
            batch_id: Uuid::new_v4(),
            conversation_id: conversation_id.clone(),
            messages: messages.to_vec(),
            context: context.to_vec(),
            hints,
            first_message_at: messages.first().and_then(InboundMessage::sent_at),
            sent_at: Utc::now(),
        }
    }
}

#[async_trait]
impl BatchAnalyzer for WebhookBatchAnalyzer {
    async fn analyze_conversation_batch(
        &self,
        conversation_id: &ConversationId,
        messages: &[InboundMessage],
        context: &[InboundMessage],
    ) -> Result<()> {
        if messages.is_empty() {
            return Ok(());
        }

        let payload = self.build_payload(conversation_id, messages, context);
        debug!(
            batch_id = %payload.batch_id,
            conversation_id = %conversation_id,
            hints_empty = payload.hints.is_empty(),
            "Posting batch to analysis webhook"
        );

        let response = self.http_client.post_json(&self.webhook_url, &payload).await?;

        info!(
            batch_id = %payload.batch_id,
            conversation_id = %conversation_id,
            batch_size = messages.len(),
            status = %response.status(),
            "Batch delivered to analysis webhook"
        );
        Ok(())
    }
}

impl std::fmt::Debug for WebhookBatchAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookBatchAnalyzer")
            .field("webhook_url", &self.webhook_url)
            .finish_non_exhaustive()
    }
}
