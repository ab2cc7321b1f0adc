//! In-memory conversation map

use std::collections::HashMap;

use chatcal_domain::{
    ConversationId, ConversationPhase, ConversationSnapshot, InboundMessage, RelevanceVerdict,
    TriageConfig,
};
use parking_lot::Mutex;

use super::state::ConversationState;
use crate::batch::ports::ConversationContext;

/// Owns every tracked [`ConversationState`].
///
/// Each call takes the map lock once and releases it before returning, so
/// callers never hold it across another lock or an `.await`.
#[derive(Debug)]
pub struct ConversationStore {
    conversations: Mutex<HashMap<ConversationId, ConversationState>>,
    context_window: usize,
}

impl ConversationStore {
    pub fn new(context_window: usize) -> Self {
        Self { conversations: Mutex::new(HashMap::new()), context_window }
    }

    /// Create the conversation on first sight, apply the message and return
    /// the phase it was in before along with a snapshot of the result.
    pub fn record(
        &self,
        conversation_id: &ConversationId,
        message: InboundMessage,
        verdict: &RelevanceVerdict,
        config: &TriageConfig,
    ) -> (ConversationPhase, ConversationSnapshot) {
        let mut conversations = self.conversations.lock();
        let state = conversations
            .entry(conversation_id.clone())
            .or_insert_with(|| ConversationState::new(conversation_id.clone(), self.context_window));
        let previous = state.phase();
        state.record_message(message, verdict, config.calendar_context_timeout_ms);
        (previous, state.snapshot())
    }

    pub fn should_analyze(&self, conversation_id: &ConversationId, now: i64, config: &TriageConfig) -> bool {
        self.conversations
            .lock()
            .get(conversation_id)
            .is_some_and(|state| state.should_analyze(now, config))
    }

    pub fn snapshot(&self, conversation_id: &ConversationId) -> Option<ConversationSnapshot> {
        self.conversations.lock().get(conversation_id).map(ConversationState::snapshot)
    }

    /// Remove every conversation idle for longer than `eviction_after_ms` and
    /// return their ids.
    pub fn evict_stale(&self, now: i64, eviction_after_ms: i64) -> Vec<ConversationId> {
        let mut conversations = self.conversations.lock();
        let stale: Vec<ConversationId> = conversations
            .values()
            .filter(|state| state.is_stale(now, eviction_after_ms))
            .map(|state| state.conversation_id().clone())
            .collect();
        for id in &stale {
            conversations.remove(id);
        }
        stale
    }

    pub fn len(&self) -> usize {
        self.conversations.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.lock().is_empty()
    }
}

impl ConversationContext for ConversationStore {
    fn recent_messages(&self, conversation_id: &ConversationId) -> Vec<InboundMessage> {
        self.conversations
            .lock()
            .get(conversation_id)
            .map(ConversationState::recent_messages)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use chatcal_domain::RelevanceSignals;

    use super::*;

    fn chatter() -> RelevanceVerdict {
        RelevanceVerdict::rejected(RelevanceSignals::default())
    }

    #[test]
    fn record_creates_on_first_sight() {
        let store = ConversationStore::new(10);
        let id = ConversationId::new("chat-a");
        assert!(store.is_empty());

        let (previous, snapshot) = store.record(
            &id,
            InboundMessage::new("hello world", "alice", 1_000),
            &chatter(),
            &TriageConfig::default(),
        );

        assert_eq!(previous, ConversationPhase::Cold);
        assert_eq!(snapshot.conversation_id, id);
        assert_eq!(snapshot.recent_messages.len(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.recent_messages(&id).len(), 1);
    }

    #[test]
    fn unknown_conversation_has_no_context() {
        let store = ConversationStore::new(10);
        let id = ConversationId::new("missing");
        assert!(store.recent_messages(&id).is_empty());
        assert!(store.snapshot(&id).is_none());
        assert!(!store.should_analyze(&id, 0, &TriageConfig::default()));
    }

    #[test]
    fn evict_stale_removes_only_idle_conversations() {
        let store = ConversationStore::new(10);
        let config = TriageConfig::default();
        store.record(&"old".into(), InboundMessage::new("hello world", "a", 0), &chatter(), &config);
        store.record(
            &"fresh".into(),
            InboundMessage::new("hello world", "b", 1_000_000),
            &chatter(),
            &config,
        );

        let evicted = store.evict_stale(config.eviction_after_ms + 1, config.eviction_after_ms);
        assert_eq!(evicted, vec![ConversationId::new("old")]);
        assert_eq!(store.len(), 1);
        assert!(store.snapshot(&"fresh".into()).is_some());
    }
}
