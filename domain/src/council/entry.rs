//! Per-member working state during one deliberation.

use crate::core::error::DomainError;
use crate::council::participant::Participant;

/// One member's slot on the discussion board.
///
/// Holds the consensus statement as this member last saw (and rewrote) it,
/// plus the votes that snapshot collected during the elite phase. Entries
/// live for a single deliberation and are discarded after the final
/// selection.
#[derive(Debug, Clone)]
pub struct DiscussionEntry {
    /// The member this slot belongs to
    pub participant: Participant,
    /// The member's most recently recorded consensus snapshot
    pub statement: String,
    /// Elite votes collected for that snapshot
    pub votes: u32,
}

impl DiscussionEntry {
    /// Open a slot for `participant`, seeded with the original prompt.
    ///
    /// Seeding with the prompt (rather than an empty string) means a
    /// deliberation whose budget expires before any member speaks still
    /// votes on something meaningful.
    pub fn new(participant: Participant, prompt: impl Into<String>) -> Self {
        Self {
            participant,
            statement: prompt.into(),
            votes: 0,
        }
    }

    /// Record the member's turn: the statement they produced becomes their
    /// visible snapshot.
    pub fn record_statement(&mut self, statement: impl Into<String>) {
        self.statement = statement.into();
    }

    /// Count one approving elite vote.
    pub fn record_vote(&mut self) {
        self.votes += 1;
    }

    /// Pick the winning entry: strictly greatest vote tally, first entry
    /// wins ties (later entries with equal votes never displace an earlier
    /// one).
    pub fn winner(entries: &[DiscussionEntry]) -> Result<&DiscussionEntry, DomainError> {
        entries
            .iter()
            .reduce(|best, entry| if entry.votes > best.votes { entry } else { best })
            .ok_or(DomainError::NoCandidates)
    }
}
