//! Prompt lifecycle entities.
//!
//! A [`PromptRecord`] is the persisted unit of work: the submitted text plus
//! everything the worker learns about it (status, answer, vote count,
//! processing time). Status moves monotonically
//! `Pending -> Processing -> Completed` or, on a dedup hit,
//! `Pending -> Cached`; a record is never reopened once terminal.

use crate::core::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a submitted prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromptStatus {
    /// Accepted and queued, not yet picked up by the worker
    #[default]
    Pending,
    /// The worker is deliberating on it
    Processing,
    /// Deliberation finished and the answer was persisted
    Completed,
    /// Answer reused from an identical completed prompt
    Cached,
}

impl PromptStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PromptStatus::Pending => "PENDING",
            PromptStatus::Processing => "PROCESSING",
            PromptStatus::Completed => "COMPLETED",
            PromptStatus::Cached => "CACHED",
        }
    }

    /// A terminal record is never mutated again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PromptStatus::Completed | PromptStatus::Cached)
    }

    /// Whether a transition to `next` is allowed.
    ///
    /// `Pending -> Cached` is legal because a dedup hit skips the
    /// processing phase entirely.
    pub fn can_transition_to(&self, next: PromptStatus) -> bool {
        matches!(
            (self, next),
            (PromptStatus::Pending, PromptStatus::Processing)
                | (PromptStatus::Pending, PromptStatus::Cached)
                | (PromptStatus::Processing, PromptStatus::Completed)
        )
    }

    /// Validate a transition, returning the new status or a domain error.
    pub fn transition_to(&self, next: PromptStatus) -> Result<PromptStatus, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::invalid_transition(self.as_str(), next.as_str()))
        }
    }
}

impl std::fmt::Display for PromptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted prompt and everything known about its resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRecord {
    /// Store-assigned identifier
    pub id: String,
    /// The submitted prompt text, matched byte-for-byte by the dedup lookup
    pub prompt: String,
    /// Current lifecycle status
    pub status: PromptStatus,
    /// Final answer; present once terminal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Vote tally of the winning discussion entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votes: Option<u32>,
    /// Wall-clock deliberation time; 0 for cached results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
    /// Per-submission discussion budget override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discussion_time_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PromptRecord {
    /// Create a fresh PENDING record as the intake handler persists it.
    pub fn new_pending(
        id: impl Into<String>,
        prompt: impl Into<String>,
        discussion_time_ms: Option<u64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            status: PromptStatus::Pending,
            answer: None,
            votes: None,
            processing_time_ms: None,
            discussion_time_ms,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update applied to a [`PromptRecord`] by id.
///
/// Only `status` is mandatory; unset fields keep their stored value.
/// The store bumps `updated_at` on every apply.
#[derive(Debug, Clone, Default)]
pub struct PromptUpdate {
    pub status: Option<PromptStatus>,
    pub answer: Option<String>,
    pub votes: Option<u32>,
    pub processing_time_ms: Option<u64>,
}

impl PromptUpdate {
    pub fn status(status: PromptStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    pub fn with_votes(mut self, votes: u32) -> Self {
        self.votes = Some(votes);
        self
    }

    pub fn with_processing_time_ms(mut self, ms: u64) -> Self {
        self.processing_time_ms = Some(ms);
        self
    }
}
