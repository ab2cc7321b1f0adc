//! Hot/cold calendar context tracking for one conversation

use std::collections::BTreeSet;

use chatcal_common::collections::RingBuffer;
use chatcal_domain::{
    ConversationId, ConversationPhase, ConversationSnapshot, InboundMessage, RelevanceVerdict,
    TriageConfig,
};

/// Live state of one conversation. Owned by the tracker's conversation store
/// and only ever mutated under its lock.
#[derive(Debug, Clone)]
pub struct ConversationState {
    conversation_id: ConversationId,
    /// Epoch (0) until the first relevant message, so a conversation that
    /// never mentioned scheduling reads as long since timed out.
    last_calendar_mention_at: i64,
    last_activity_at: i64,
    participants: BTreeSet<String>,
    messages_since_calendar_mention: u32,
    calendar_context_active: bool,
    recent_messages: RingBuffer<InboundMessage>,
}

impl ConversationState {
    pub fn new(conversation_id: ConversationId, context_window: usize) -> Self {
        Self {
            conversation_id,
            last_calendar_mention_at: 0,
            last_activity_at: 0,
            participants: BTreeSet::new(),
            messages_since_calendar_mention: 0,
            calendar_context_active: false,
            recent_messages: RingBuffer::new(context_window),
        }
    }

    /// Apply one inbound message.
    ///
    /// The message's own timestamp is "now" for every comparison. A relevant
    /// verdict turns the conversation hot and resets the drift counter. The
    /// idle check runs last, so a relevant message can never be immediately
    /// undone by it.
    pub fn record_message(
        &mut self,
        message: InboundMessage,
        verdict: &RelevanceVerdict,
        calendar_context_timeout_ms: i64,
    ) {
        let now = message.timestamp;

        self.participants.insert(message.sender.clone());
        self.last_activity_at = now;
        self.messages_since_calendar_mention = self.messages_since_calendar_mention.saturating_add(1);
        self.recent_messages.push(message);

        if verdict.relevant {
            self.last_calendar_mention_at = now;
            self.messages_since_calendar_mention = 0;
            self.calendar_context_active = true;
        }

        if now.saturating_sub(self.last_calendar_mention_at) > calendar_context_timeout_ms {
            self.calendar_context_active = false;
        }
    }

    /// Recently active, hot, and not yet drifted off-topic.
    pub fn should_analyze(&self, now: i64, config: &TriageConfig) -> bool {
        now.saturating_sub(self.last_activity_at) < config.activity_window_ms
            && self.calendar_context_active
            && self.messages_since_calendar_mention < config.max_messages_since_mention
    }

    /// Idle for longer than `eviction_after_ms`.
    pub fn is_stale(&self, now: i64, eviction_after_ms: i64) -> bool {
        now.saturating_sub(self.last_activity_at) > eviction_after_ms
    }

    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    pub fn phase(&self) -> ConversationPhase {
        ConversationPhase::from_active(self.calendar_context_active)
    }

    pub fn calendar_context_active(&self) -> bool {
        self.calendar_context_active
    }

    pub fn last_activity_at(&self) -> i64 {
        self.last_activity_at
    }

    pub fn last_calendar_mention_at(&self) -> i64 {
        self.last_calendar_mention_at
    }

    pub fn messages_since_calendar_mention(&self) -> u32 {
        self.messages_since_calendar_mention
    }

    /// Oldest first.
    pub fn recent_messages(&self) -> Vec<InboundMessage> {
        self.recent_messages.to_vec()
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            conversation_id: self.conversation_id.clone(),
            phase: self.phase(),
            calendar_context_active: self.calendar_context_active,
            last_calendar_mention_at: self.last_calendar_mention_at,
            last_activity_at: self.last_activity_at,
            messages_since_calendar_mention: self.messages_since_calendar_mention,
            participants: self.participants.clone(),
            recent_messages: self.recent_messages(),
        }
    }
}
