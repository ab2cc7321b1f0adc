//! Newline-delimited JSON ingest
//!
//! Each line is one chat message:
//! `{"conversation_id": "...", "text": "...", "sender": "...", "timestamp": 1700000000000}`.
//! `timestamp` (milliseconds) is optional and defaults to the tracker clock.
//! Malformed lines are logged and skipped.

use chatcal_core::ConversationTracker;
use chatcal_domain::utils::text::preview;
use chatcal_domain::{ChatCalError, ConversationId, Result};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One inbound message as read from the transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InboundLine {
    pub conversation_id: ConversationId,
    pub text: String,
    pub sender: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Counters for a finished ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub accepted: usize,
    pub rejected: usize,
}

/// Parse a single line. Blank lines yield `Ok(None)`.
///
/// # Errors
/// `ChatCalError::InvalidInput` for malformed JSON or an empty
/// conversation id.
pub fn parse_line(line: &str) -> Result<Option<InboundLine>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let parsed: InboundLine = serde_json::from_str(line)
        .map_err(|e| ChatCalError::InvalidInput(format!("malformed message line: {e}")))?;

    if parsed.conversation_id.as_str().trim().is_empty() {
        return Err(ChatCalError::InvalidInput("conversation_id must not be empty".into()));
    }
    Ok(Some(parsed))
}

/// Feed every line from `reader` into the tracker until EOF or `shutdown`.
///
/// # Errors
/// Only read failures on `reader` end the run with an error.
pub async fn run_ingest<R>(
    reader: R,
    tracker: &ConversationTracker,
    shutdown: CancellationToken,
) -> Result<IngestStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = IngestStats::default();

    loop {
        let next = tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("Ingest cancelled");
                break;
            }
            next = lines.next_line() => next,
        };

        let line = match next {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Input closed");
                break;
            }
            Err(e) => return Err(ChatCalError::Internal(format!("failed to read input: {e}"))),
        };

        match parse_line(&line) {
            Ok(Some(message)) => {
                tracker.add_message(
                    &message.conversation_id,
                    &message.text,
                    &message.sender,
                    message.timestamp,
                );
                stats.accepted += 1;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, line = %preview(&line), "Skipping input line");
                stats.rejected += 1;
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chatcal_infra::LoggingBatchAnalyzer;
    use tokio::io::BufReader;

    use super::*;

    #[test]
    fn parses_message_with_and_without_timestamp() {
        let line = r#"{"conversation_id":"+15550001111","text":"lunch?","sender":"ana","timestamp":42}"#;
        let parsed = parse_line(line).unwrap().unwrap();
        assert_eq!(parsed.conversation_id.as_str(), "+15550001111");
        assert_eq!(parsed.timestamp, Some(42));

        let line = r#"{"conversation_id":"g1","text":"hi","sender":"ben"}"#;
        assert_eq!(parse_line(line).unwrap().unwrap().timestamp, None);
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("").unwrap(), None);
    }

    #[test]
    fn malformed_lines_are_invalid_input() {
        assert!(matches!(parse_line("not json"), Err(ChatCalError::InvalidInput(_))));
        assert!(matches!(
            parse_line(r#"{"conversation_id":"g1","sender":"ben"}"#),
            Err(ChatCalError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_line(r#"{"conversation_id":" ","text":"hi","sender":"ben"}"#),
            Err(ChatCalError::InvalidInput(msg)) if msg.contains("conversation_id")
        ));
    }

    #[tokio::test]
    async fn ingest_feeds_tracker_and_counts_rejects() {
        let input = concat!(
            r#"{"conversation_id":"g1","text":"dinner friday at 7pm?","sender":"ana","timestamp":1000}"#,
            "\n",
            "garbage\n",
            "\n",
            r#"{"conversation_id":"g1","text":"works for me","sender":"ben","timestamp":2000}"#,
            "\n",
            r#"{"conversation_id":"g2","text":"how was the trip","sender":"cy","timestamp":3000}"#,
            "\n",
        );
        let tracker = ConversationTracker::new(Arc::new(LoggingBatchAnalyzer));

        let stats = run_ingest(
            BufReader::new(input.as_bytes()),
            &tracker,
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(stats, IngestStats { accepted: 3, rejected: 1 });
        assert_eq!(tracker.conversation_count(), 2);
        assert_eq!(tracker.pending_len(&"g1".into()), 2);

        let g1 = tracker.conversation(&"g1".into()).unwrap();
        assert_eq!(g1.recent_messages.len(), 2);
        assert!(g1.calendar_context_active);
    }

    #[tokio::test]
    async fn cancelled_ingest_stops_without_reading() {
        let tracker = ConversationTracker::new(Arc::new(LoggingBatchAnalyzer));
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let (_writer, reader) = tokio::io::duplex(64);
        let stats = run_ingest(BufReader::new(reader), &tracker, shutdown).await.unwrap();

        assert_eq!(stats, IngestStats::default());
    }
}
