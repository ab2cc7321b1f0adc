//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! triage pipeline. Timing values are the defaults of [`crate::TriageConfig`];
//! scoring weights are fixed.

// Relevance scoring
pub const MIN_MESSAGE_CHARS: usize = 8;
pub const RELEVANCE_THRESHOLD: u32 = 3;
pub const CONFIDENCE_FULL_SCORE: f32 = 5.0;
pub const KEYWORD_WEIGHT: u32 = 3;
pub const TIME_PATTERN_WEIGHT: u32 = 2;
pub const DATE_PATTERN_WEIGHT: u32 = 2;
pub const MENTION_WEIGHT: u32 = 1;
pub const INTENT_PHRASE_WEIGHT: u32 = 2;

// Conversation state
pub const RECENT_MESSAGE_CAPACITY: usize = 10;
pub const CALENDAR_CONTEXT_TIMEOUT_MS: i64 = 5 * 60 * 1000;
pub const ACTIVE_CONVERSATION_WINDOW_MS: i64 = 2 * 60 * 1000;
pub const MAX_MESSAGES_SINCE_MENTION: u32 = 15;
pub const CONVERSATION_EVICTION_MS: i64 = 30 * 60 * 1000;

// Batching
pub const BATCH_TIMEOUT_MS: u64 = 45_000;
pub const MAX_BATCH_SIZE: usize = 10;

// Host plumbing
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_ANALYZER_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ANALYZER_MAX_ATTEMPTS: usize = 3;

// Diagnostics
pub const LOG_PREVIEW_CHARS: usize = 50;
pub const PREVIEW_TRUNCATE_SUFFIX: &str = "...";
