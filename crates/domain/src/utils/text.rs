//! Message text helpers for logging

use crate::constants::{LOG_PREVIEW_CHARS, PREVIEW_TRUNCATE_SUFFIX};

/// Shorten message text for diagnostic log lines.
///
/// Keeps the first [`LOG_PREVIEW_CHARS`] characters and appends
/// [`PREVIEW_TRUNCATE_SUFFIX`] when anything was cut. Counts chars, not
/// bytes, so multi-byte text never splits inside a code point.
///
/// # Examples
///
/// ```
/// use chatcal_domain::utils::text::preview;
///
/// assert_eq!(preview("lunch?"), "lunch?");
/// assert_eq!(preview(&"a".repeat(60)), format!("{}...", "a".repeat(50)));
/// ```
#[must_use]
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], PREVIEW_TRUNCATE_SUFFIX),
        None => text.to_string(),
    }
}

/// Length of `text` in characters, surrounding whitespace included.
#[must_use]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
