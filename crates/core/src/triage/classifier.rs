//! Heuristic calendar relevance classifier
//!
//! Cheap, synchronous scoring that decides whether a message could be about
//! scheduling. Only messages that pass feed the hot/cold conversation state;
//! every message still reaches the batch scheduler.

use chatcal_domain::constants::{
    CONFIDENCE_FULL_SCORE, DATE_PATTERN_WEIGHT, INTENT_PHRASE_WEIGHT, KEYWORD_WEIGHT,
    MENTION_WEIGHT, MIN_MESSAGE_CHARS, RELEVANCE_THRESHOLD, TIME_PATTERN_WEIGHT,
};
use chatcal_domain::utils::text::{char_len, preview};
use chatcal_domain::{MessageHints, RelevanceSignals, RelevanceVerdict};
use tracing::debug;

use super::patterns::{
    has_intent_phrase, is_acknowledgement, DATE_PATTERN, KEYWORD_PATTERN, MENTION_PATTERN,
    TIME_PATTERN,
};

/// Decides calendar relevance for a single message.
pub trait MessageClassifier: Send + Sync {
    /// Score one message. Must be pure and must not fail.
    fn classify(&self, text: &str) -> RelevanceVerdict;

    /// Raw matched substrings, used when building analysis payloads.
    fn extract_hints(&self, text: &str) -> MessageHints;
}

/// Keyword/time/date/mention/intent scoring classifier.
///
/// | Signal        | Weight |
/// |---------------|--------|
/// | keyword       | 3      |
/// | time          | 2      |
/// | date          | 2      |
/// | intent phrase | 2      |
/// | `@mention`    | 1      |
///
/// A message is relevant at a score of 3 or more. Confidence is the score
/// over 5, capped at 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self
    }

    fn score(text: &str) -> (u32, RelevanceSignals) {
        let signals = RelevanceSignals {
            keyword: KEYWORD_PATTERN.is_match(text),
            time: TIME_PATTERN.is_match(text),
            date: DATE_PATTERN.is_match(text),
            mention: MENTION_PATTERN.is_match(text),
            intent_phrase: has_intent_phrase(text),
            ..RelevanceSignals::default()
        };

        let weighted = [
            (signals.keyword, KEYWORD_WEIGHT),
            (signals.time, TIME_PATTERN_WEIGHT),
            (signals.date, DATE_PATTERN_WEIGHT),
            (signals.mention, MENTION_WEIGHT),
            (signals.intent_phrase, INTENT_PHRASE_WEIGHT),
        ];
        let score = weighted.iter().filter(|(fired, _)| *fired).map(|(_, weight)| weight).sum();

        (score, signals)
    }
}

impl MessageClassifier for HeuristicClassifier {
    fn classify(&self, text: &str) -> RelevanceVerdict {
        if is_acknowledgement(text) {
            return RelevanceVerdict::rejected(RelevanceSignals {
                acknowledgement: true,
                ..RelevanceSignals::default()
            });
        }

        if char_len(text) < MIN_MESSAGE_CHARS {
            return RelevanceVerdict::rejected(RelevanceSignals {
                too_short: true,
                ..RelevanceSignals::default()
            });
        }

        let (score, signals) = Self::score(text);
        let relevant = score >= RELEVANCE_THRESHOLD;
        #[allow(clippy::cast_precision_loss)]
        let confidence = (score as f32 / CONFIDENCE_FULL_SCORE).min(1.0);

        debug!(
            score,
            relevant,
            confidence,
            preview = %preview(text),
            "Classified message"
        );

        RelevanceVerdict { relevant, score, confidence, signals }
    }

    fn extract_hints(&self, text: &str) -> MessageHints {
        fn collect(pattern: &regex::Regex, text: &str, fold_case: bool) -> Vec<String> {
            let mut found: Vec<String> = Vec::new();
            for matched in pattern.find_iter(text) {
                let value = if fold_case {
                    matched.as_str().to_lowercase()
                } else {
                    matched.as_str().to_string()
                };
                if !found.contains(&value) {
                    found.push(value);
                }
            }
            found
        }

        MessageHints {
            times: collect(&TIME_PATTERN, text, false),
            dates: collect(&DATE_PATTERN, text, false),
            mentions: collect(&MENTION_PATTERN, text, false),
            keywords: collect(&KEYWORD_PATTERN, text, true),
        }
    }
}
