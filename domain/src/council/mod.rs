//! Council domain.
//!
//! The council resolves a prompt in three phases:
//!
//! ```text
//! ┌────────────────────┐   ┌──────────────────┐   ┌─────────────────┐
//! │ General Discussion │──►│  Elite Voting    │──►│ Final Selection │
//! │ members pass one   │   │ every elite votes│   │ greatest tally, │
//! │ evolving statement │   │ on every snapshot│   │ first wins ties │
//! └────────────────────┘   └──────────────────┘   └─────────────────┘
//! ```
//!
//! - [`participant::Participant`] — one generation agent, member or elite
//! - [`entry::DiscussionEntry`] — a member's snapshot + vote tally
//! - [`prompt::PromptRecord`] — the persisted unit of work
//! - [`state::CouncilState`] — what the engine is doing right now
//! - [`event`] — messages carried on the council topics
//! - [`statement`] — response length rules

pub mod entry;
pub mod event;
pub mod participant;
pub mod prompt;
pub mod state;
pub mod statement;

// Re-export main types
pub use entry::DiscussionEntry;
pub use event::{PromptStatusEvent, PromptSubmission, ResponseSavedEvent};
pub use participant::{Participant, Role};
pub use prompt::{PromptRecord, PromptStatus, PromptUpdate};
pub use state::CouncilState;
pub use statement::{StatementFit, StatementLimits, TRUNCATION_MARKER, clamp_statement};
