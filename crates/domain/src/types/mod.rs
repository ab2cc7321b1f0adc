//! Domain types and models

pub mod batch;
pub mod conversation;
pub mod triage;

pub use batch::FlushReason;
pub use conversation::{ConversationId, ConversationPhase, ConversationSnapshot, InboundMessage};
pub use triage::{MessageHints, RelevanceSignals, RelevanceVerdict};
