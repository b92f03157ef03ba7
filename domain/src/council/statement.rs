//! Consensus statement length rules.
//!
//! Member responses feed straight back into the next generation request, so
//! an unbounded response compounds across rounds. Responses over the hard
//! cap are cut and marked; responses past the warning length are left alone
//! but worth logging.

use std::borrow::Cow;

/// Marker appended to a statement that was cut at the hard cap.
pub const TRUNCATION_MARKER: &str = "...";

/// Length limits applied to every generated statement, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementLimits {
    /// Hard cap; anything longer is truncated to this many characters
    pub max_chars: usize,
    /// Soft threshold; crossing it is reported but the text is unchanged
    pub warn_chars: usize,
}

impl Default for StatementLimits {
    fn default() -> Self {
        Self {
            max_chars: 5000,
            warn_chars: 4000,
        }
    }
}

/// How a statement measured up against [`StatementLimits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementFit {
    /// At or under the warning length
    Within,
    /// Over the warning length but under the cap; text unchanged
    NearLimit { chars: usize },
    /// Over the cap; text cut to `max_chars` plus the marker
    Truncated { original_chars: usize },
}

/// Apply the length rules to a generated response.
///
/// Returns the (possibly cut) statement and what happened to it. Counting
/// is per `char`, so multi-byte text is never split mid-character.
pub fn clamp_statement<'a>(
    response: &'a str,
    limits: &StatementLimits,
) -> (Cow<'a, str>, StatementFit) {
    let chars = response.chars().count();

    if chars > limits.max_chars {
        let mut cut: String = response.chars().take(limits.max_chars).collect();
        cut.push_str(TRUNCATION_MARKER);
        return (
            Cow::Owned(cut),
            StatementFit::Truncated {
                original_chars: chars,
            },
        );
    }

    if chars > limits.warn_chars {
        return (Cow::Borrowed(response), StatementFit::NearLimit { chars });
    }

    (Cow::Borrowed(response), StatementFit::Within)
}
