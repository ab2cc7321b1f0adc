//! Wire types for the batch analysis webhook

use chatcal_domain::{ConversationId, InboundMessage, MessageHints};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JSON body POSTed for every flushed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPayload {
    /// Fresh per delivery; lets the receiver de-duplicate retried POSTs.
    pub batch_id: Uuid,
    pub conversation_id: ConversationId,
    /// Batched messages in arrival order.
    pub messages: Vec<InboundMessage>,
    /// The conversation's recent-message window at flush time.
    pub context: Vec<InboundMessage>,
    /// Times, dates, mentions and keywords found across `messages`.
    pub hints: MessageHints,
    /// Send time of the first batched message, when its timestamp is in
    /// range.
    pub first_message_at: Option<DateTime<Utc>>,
    pub sent_at: DateTime<Utc>,
}
