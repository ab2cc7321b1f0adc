//! Conversation and message types
//!
//! A conversation is any chat or thread the transport can address; all
//! per-conversation state in the pipeline is keyed by [`ConversationId`].

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Opaque key identifying a chat or thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Wrap a transport-provided chat identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ConversationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ConversationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ConversationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A single chat message as received from the transport. Immutable once
/// created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub text: String,
    pub sender: String,
    /// Milliseconds since the UNIX epoch.
    pub timestamp: i64,
}

impl InboundMessage {
    pub fn new(text: impl Into<String>, sender: impl Into<String>, timestamp: i64) -> Self {
        Self { text: text.into(), sender: sender.into(), timestamp }
    }

    /// Timestamp as a UTC datetime, if it is within chrono's range.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Whether a conversation is currently a scheduling discussion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    /// No calendar-relevant message in the context timeout window.
    #[default]
    Cold,
    /// A calendar-relevant message arrived recently.
    Hot,
}

impl_domain_status_conversions!(ConversationPhase {
    Cold => "cold",
    Hot => "hot",
});

impl ConversationPhase {
    pub fn from_active(calendar_context_active: bool) -> Self {
        if calendar_context_active {
            Self::Hot
        } else {
            Self::Cold
        }
    }
}

/// Owned copy of one conversation's tracked state, handed to callers after
/// each ingestion. The live state never leaves the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    pub conversation_id: ConversationId,
    pub phase: ConversationPhase,
    pub calendar_context_active: bool,
    pub last_calendar_mention_at: i64,
    pub last_activity_at: i64,
    pub messages_since_calendar_mention: u32,
    pub participants: BTreeSet<String>,
    /// Oldest first.
    pub recent_messages: Vec<InboundMessage>,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn conversation_id_looks_up_by_str() {
        let mut map = HashMap::new();
        map.insert(ConversationId::new("group-42"), 1);
        assert_eq!(map.get("group-42"), Some(&1));
        assert_eq!(ConversationId::from("group-42").to_string(), "group-42");
    }

    #[test]
    fn conversation_id_serializes_transparently() {
        let id = ConversationId::new("+15550001111");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"+15550001111\"");
    }

    #[test]
    fn sent_at_converts_epoch_millis() {
        let message = InboundMessage::new("hello there", "alice", 1_700_000_000_000);
        let sent_at = message.sent_at().unwrap();
        assert_eq!(sent_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn phase_follows_active_flag() {
        assert_eq!(ConversationPhase::from_active(true), ConversationPhase::Hot);
        assert_eq!(ConversationPhase::from_active(false), ConversationPhase::Cold);
        assert_eq!(ConversationPhase::Hot.to_string(), "hot");
    }
}
