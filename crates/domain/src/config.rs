//! Configuration structures
//!
//! Every section defaults to the production values in [`crate::constants`],
//! so a config file only needs to name what it overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ACTIVE_CONVERSATION_WINDOW_MS, BATCH_TIMEOUT_MS, CALENDAR_CONTEXT_TIMEOUT_MS,
    CONVERSATION_EVICTION_MS, DEFAULT_ANALYZER_MAX_ATTEMPTS, DEFAULT_ANALYZER_TIMEOUT_SECS,
    DEFAULT_CLEANUP_INTERVAL_SECS, MAX_BATCH_SIZE, MAX_MESSAGES_SINCE_MENTION,
    RECENT_MESSAGE_CAPACITY,
};

/// Top-level configuration for a ChatCal host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub triage: TriageConfig,
    pub analyzer: AnalyzerConfig,
    pub cleanup: CleanupConfig,
    pub logging: LoggingConfig,
}

/// Timing and sizing knobs for conversation tracking and batching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Quiet period before a pending batch is flushed.
    pub batch_timeout_ms: u64,
    /// Pending size that forces an immediate flush.
    pub max_batch_size: usize,
    /// Number of recent messages kept per conversation as LLM context.
    pub context_window: usize,
    /// Calendar context goes cold this long after the last relevant message.
    pub calendar_context_timeout_ms: i64,
    /// A conversation counts as active if it saw a message this recently.
    pub activity_window_ms: i64,
    /// Conversations drift off-topic after this many unrelated messages.
    pub max_messages_since_mention: u32,
    /// Idle conversations are evicted after this long.
    pub eviction_after_ms: i64,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            batch_timeout_ms: BATCH_TIMEOUT_MS,
            max_batch_size: MAX_BATCH_SIZE,
            context_window: RECENT_MESSAGE_CAPACITY,
            calendar_context_timeout_ms: CALENDAR_CONTEXT_TIMEOUT_MS,
            activity_window_ms: ACTIVE_CONVERSATION_WINDOW_MS,
            max_messages_since_mention: MAX_MESSAGES_SINCE_MENTION,
            eviction_after_ms: CONVERSATION_EVICTION_MS,
        }
    }
}

impl TriageConfig {
    /// Debounce delay as a [`Duration`].
    pub fn batch_timeout(&self) -> Duration {
        Duration::from_millis(self.batch_timeout_ms)
    }
}

/// Outbound analysis webhook settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// When false, flushed batches are only logged.
    pub enabled: bool,
    /// Endpoint receiving flushed batches as JSON.
    pub webhook_url: Option<String>,
    pub timeout_secs: u64,
    /// Total HTTP attempts per batch (initial try + retries).
    pub max_attempts: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            webhook_url: None,
            timeout_secs: DEFAULT_ANALYZER_TIMEOUT_SECS,
            max_attempts: DEFAULT_ANALYZER_MAX_ATTEMPTS,
        }
    }
}

/// Periodic eviction sweep settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    pub interval_secs: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self { interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS }
    }
}

/// Log output settings for the host binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
