//! Process-wide council state.

use serde::{Deserialize, Serialize};

/// What the deliberation engine is doing right now.
///
/// The worker is a single serial consumer, so at most one deliberation is
/// ever in flight and this state needs no locking beyond the engine handle
/// itself.
///
/// ```text
/// ADJOURNED ──► IN_SESSION ──► EVALUATING ──► ADJOURNED
///   (idle)      (discussion)    (voting)       (idle)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouncilState {
    /// Idle, waiting for work
    #[default]
    Adjourned,
    /// General discussion in progress
    InSession,
    /// Elite voting in progress
    Evaluating,
}

impl CouncilState {
    pub fn as_str(&self) -> &str {
        match self {
            CouncilState::Adjourned => "ADJOURNED",
            CouncilState::InSession => "IN_SESSION",
            CouncilState::Evaluating => "EVALUATING",
        }
    }
}

impl std::fmt::Display for CouncilState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
