//! Shared utility functions.

use std::borrow::Cow;

/// Shorten a string for log output to at most `max_chars` characters,
/// appending `…` when something was cut.
///
/// Counting is per `char`, so multi-byte text is never split. Unlike the
/// statement clamp in [`crate::council::statement`], this is purely
/// cosmetic and never feeds back into generation.
pub fn preview(s: &str, max_chars: usize) -> Cow<'_, str> {
    let mut indices = s.char_indices();
    match indices.nth(max_chars) {
        None => Cow::Borrowed(s),
        Some((byte_idx, _)) => {
            let mut cut = s[..byte_idx].to_string();
            cut.push('…');
            Cow::Owned(cut)
        }
    }
}
