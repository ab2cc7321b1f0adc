//! Compiled patterns for calendar relevance heuristics
//!
//! All matching is case-insensitive. Keyword and date patterns are anchored
//! on word boundaries so that "recall" does not count as "call" and "async"
//! does not count as "sync". Keywords also match their plural and inflected
//! forms ("meetings", "calls", "scheduled", "inviting").
//!
//! # Examples
//!
//! ```
//! use chatcal_core::triage::patterns::{is_high_priority, TIME_PATTERN};
//!
//! assert!(TIME_PATTERN.is_match("see you at 3:30 PM"));
//! assert!(is_high_priority("can you book an appointment asap"));
//! assert!(!is_high_priority("wasapi driver update"));
//! ```

use lazy_static::lazy_static;
use regex::{Regex, RegexSet};

/// Calendar-domain vocabulary. Each entry is matched as a whole word, with an
/// optional `s`/`es`/`ed`/`ing` ending.
pub const CALENDAR_KEYWORDS: &[&str] = &[
    "meeting",
    "meet",
    "schedule",
    "appointment",
    "calendar",
    "call",
    "zoom",
    "teams",
    "hangout",
    "lunch",
    "dinner",
    "breakfast",
    "coffee",
    "event",
    "reminder",
    "deadline",
    "conference",
    "interview",
    "session",
    "standup",
    "sync",
    "catch up",
    "invite",
    "booking",
    "reservation",
];

/// Keywords that also count with a `re` prefix ("reschedule", "rebooking").
const RE_PREFIXED_KEYWORDS: &[&str] = &["schedule", "booking", "invite"];

/// Phrases that signal an intent to set something up. Matched as substrings
/// of the lowercased message.
pub const INTENT_PHRASES: &[&str] = &[
    "let's meet",
    "lets meet",
    "let's schedule",
    "can we schedule",
    "available for",
    "are you free",
    "how about",
    "what time",
    "book a",
];

/// Whole-message acknowledgements that never carry scheduling content.
pub const ACKNOWLEDGEMENTS: &[&str] = &[
    "hi",
    "hey",
    "hello",
    "ok",
    "okay",
    "k",
    "kk",
    "thanks",
    "thank you",
    "thx",
    "ty",
    "lol",
    "lol ok",
    "lmao",
    "haha",
    "hahaha",
    "yes",
    "yep",
    "yeah",
    "no",
    "nope",
    "sure",
    "cool",
    "nice",
    "great",
    "got it",
    "sounds good",
    "good morning",
    "good night",
    "gm",
    "gn",
];

/// Phrases that make a pending batch worth analyzing immediately.
const PRIORITY_PATTERNS: &[&str] = &[
    r"(?i)schedule.*meeting",
    r"(?i)book.*appointment",
    r"(?i)zoom.*tomorrow",
    r"(?i)calendar.*invite",
    r"(?i)urgent.*meeting",
    r"(?i)\basap\b",
];

lazy_static! {
    /// Clock times such as "3pm", "10:30 am" or "7 PM". Digits may follow
    /// a word directly ("at3pm"); the meridiem must end the word.
    pub static ref TIME_PATTERN: Regex =
        Regex::new(r"(?i)\d{1,2}(?::\d{2})?\s*(?:am|pm)\b").expect("time pattern is valid");

    /// Relative days, weekday names, "next week"/"this week" and m/d dates.
    pub static ref DATE_PATTERN: Regex = Regex::new(
        r"(?i)\b(?:today|tomorrow|monday|tuesday|wednesday|thursday|friday|saturday|sunday|next week|this week)\b|\b\d{1,2}/\d{1,2}\b",
    )
    .expect("date pattern is valid");

    /// `@handle` mentions.
    pub static ref MENTION_PATTERN: Regex =
        Regex::new(r"@\w+").expect("mention pattern is valid");

    /// Any entry of [`CALENDAR_KEYWORDS`] as a whole word, inflections
    /// included.
    pub static ref KEYWORD_PATTERN: Regex = {
        let alternation = CALENDAR_KEYWORDS
            .iter()
            .map(|keyword| keyword_alternative(keyword))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("keyword pattern is valid")
    };

    static ref PRIORITY_SET: RegexSet =
        RegexSet::new(PRIORITY_PATTERNS).expect("priority patterns are valid");
}

/// Regex fragment for one keyword and its inflected forms. A trailing `e` is
/// dropped before `ed`/`ing` ("scheduled", "inviting").
fn keyword_alternative(keyword: &str) -> String {
    let prefix = if RE_PREFIXED_KEYWORDS.contains(&keyword) { "(?:re)?" } else { "" };
    match keyword.strip_suffix('e') {
        Some(stem) => format!("{prefix}{}(?:e|es|ed|ing)", regex::escape(stem)),
        None => format!("{prefix}{}(?:s|es|ed|ing)?", regex::escape(keyword)),
    }
}

/// True when a message should bypass the debounce window.
pub fn is_high_priority(text: &str) -> bool {
    PRIORITY_SET.is_match(text)
}

/// Lowercase and fold typographic apostrophes so phrase lists match text
/// typed on phones.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

/// Exact (whole message) acknowledgement match, or a message made only of
/// emoji and punctuation.
pub fn is_acknowledgement(text: &str) -> bool {
    let normalized = normalize(text);
    let stripped = normalized.trim_end_matches(['!', '.', '?', ' ']);
    if ACKNOWLEDGEMENTS.contains(&stripped) {
        return true;
    }
    !normalized.is_empty() && !normalized.chars().any(char::is_alphanumeric)
}

/// Whether any phrase of [`INTENT_PHRASES`] occurs in the message.
pub fn has_intent_phrase(text: &str) -> bool {
    let normalized = normalize(text);
    INTENT_PHRASES.iter().any(|phrase| normalized.contains(phrase))
}
