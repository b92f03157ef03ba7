//! Domain layer for agent-council
//!
//! This crate contains the core entities and council rules. It has no
//! dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A council resolves each prompt through deliberation:
//!
//! - **General Discussion**: members pass one evolving consensus statement
//!   around the table until the time budget runs out
//! - **Elite Voting**: a second panel votes on every member's last snapshot
//! - **Final Selection**: the snapshot with the strictly greatest tally wins
//!
//! ## Prompt lifecycle
//!
//! `PENDING -> PROCESSING -> COMPLETED`, or `PENDING -> CACHED` when an
//! identical prompt already completed. Terminal records are never reopened.

pub mod core;
pub mod council;
pub mod util;

// Re-export commonly used types
pub use crate::core::error::DomainError;
pub use council::{
    CouncilState, DiscussionEntry, Participant, PromptRecord, PromptStatus, PromptStatusEvent,
    PromptSubmission, PromptUpdate, ResponseSavedEvent, Role, StatementFit, StatementLimits,
    TRUNCATION_MARKER, clamp_statement,
};
pub use util::preview;
