//! Conversation state and the in-memory store that owns it

pub mod state;
pub mod store;

pub use state::ConversationState;
pub use store::ConversationStore;
