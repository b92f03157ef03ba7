//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("No members configured for the council")]
    NoMembers,

    #[error("No elites configured for the council")]
    NoElites,

    #[error("Missing required field: prompt")]
    EmptyPrompt,

    #[error("Final selection requires at least one discussion entry")]
    NoCandidates,

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl DomainError {
    /// Build an [`DomainError::InvalidTransition`] from the two statuses involved.
    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        DomainError::InvalidTransition {
            from: from.into(),
            to: to.into(),
        }
    }
}
