//! End-to-end: NDJSON input → tracker → analyzer

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chatcal_bot::{run_ingest, IngestStats};
use chatcal_core::{BatchAnalyzer, ConversationTracker};
use chatcal_domain::{ConversationId, InboundMessage, Result};
use tokio::io::BufReader;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio_util::sync::CancellationToken;

struct ChannelAnalyzer {
    tx: UnboundedSender<(ConversationId, Vec<String>)>,
}

#[async_trait]
impl BatchAnalyzer for ChannelAnalyzer {
    async fn analyze_conversation_batch(
        &self,
        conversation_id: &ConversationId,
        messages: &[InboundMessage],
        _context: &[InboundMessage],
    ) -> Result<()> {
        let texts = messages.iter().map(|m| m.text.clone()).collect();
        let _ = self.tx.send((conversation_id.clone(), texts));
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn stdin_lines_are_batched_per_conversation() {
    let (tx, mut rx) = unbounded_channel();
    let tracker = ConversationTracker::new(Arc::new(ChannelAnalyzer { tx }));

    let input = [
        r#"{"conversation_id":"family","text":"anyone around saturday?","sender":"mom"}"#,
        r#"{"conversation_id":"work","text":"please book a room, urgent meeting asap","sender":"lead"}"#,
        r#"{"conversation_id":"family","text":"yes!","sender":"kid"}"#,
        r#"{"conversation_id":"family""#,
    ]
    .join("\n");

    let stats = run_ingest(BufReader::new(input.as_bytes()), &tracker, CancellationToken::new())
        .await
        .expect("ingest runs");
    assert_eq!(stats, IngestStats { accepted: 3, rejected: 1 });

    // Priority message flushes without waiting for the debounce window
    let (id, texts) = rx.recv().await.expect("work batch");
    assert_eq!(id.as_str(), "work");
    assert_eq!(texts.len(), 1);

    let started = tokio::time::Instant::now();
    let (id, texts) = rx.recv().await.expect("family batch");
    assert_eq!(id.as_str(), "family");
    assert_eq!(texts, ["anyone around saturday?", "yes!"]);
    assert!(started.elapsed() >= Duration::from_millis(44_000));
}
