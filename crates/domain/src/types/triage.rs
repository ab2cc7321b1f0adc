//! Relevance classification results

use serde::{Deserialize, Serialize};

/// Which heuristic signals fired for a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceSignals {
    /// Rejected by the minimum length gate before scoring.
    pub too_short: bool,
    /// Rejected by the social acknowledgement exclusion list before scoring.
    pub acknowledgement: bool,
    pub keyword: bool,
    pub time: bool,
    pub date: bool,
    pub mention: bool,
    pub intent_phrase: bool,
}

/// Verdict produced by a message classifier.
///
/// `confidence` is the score normalized into `[0, 1]`. It is a relative
/// ranking signal, not a probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceVerdict {
    pub relevant: bool,
    pub score: u32,
    pub confidence: f32,
    pub signals: RelevanceSignals,
}

impl RelevanceVerdict {
    /// Non-relevant verdict for a message rejected before scoring.
    pub fn rejected(signals: RelevanceSignals) -> Self {
        Self { relevant: false, score: 0, confidence: 0.0, signals }
    }
}

/// Raw substrings matched in a message, for prompt building downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHints {
    pub times: Vec<String>,
    pub dates: Vec<String>,
    pub mentions: Vec<String>,
    pub keywords: Vec<String>,
}

impl MessageHints {
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
            && self.dates.is_empty()
            && self.mentions.is_empty()
            && self.keywords.is_empty()
    }

    /// Fold another message's hints in, keeping first-seen order and dropping
    /// duplicates.
    pub fn merge(&mut self, other: Self) {
        fn extend_unique(target: &mut Vec<String>, source: Vec<String>) {
            for value in source {
                if !target.contains(&value) {
                    target.push(value);
                }
            }
        }

        extend_unique(&mut self.times, other.times);
        extend_unique(&mut self.dates, other.dates);
        extend_unique(&mut self.mentions, other.mentions);
        extend_unique(&mut self.keywords, other.keywords);
    }
}
