//! Messages carried on the council topics.
//!
//! Wire names are camelCase for compatibility with the existing consumers
//! of these topics; see [`crate::council::prompt::PromptStatus`] for the
//! status wire values.

use crate::core::error::DomainError;
use crate::council::prompt::{PromptRecord, PromptStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inbound submission on the queue topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSubmission {
    pub prompt: String,
    /// Per-submission discussion budget override, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discussion_time_ms: Option<u64>,
}

impl PromptSubmission {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            discussion_time_ms: None,
        }
    }

    pub fn with_discussion_time_ms(mut self, ms: u64) -> Self {
        self.discussion_time_ms = Some(ms);
        self
    }

    /// Boundary validation: a submission without prompt text is rejected,
    /// never queued.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.prompt.trim().is_empty() {
            return Err(DomainError::EmptyPrompt);
        }
        Ok(())
    }
}

/// Published on the status-changed topic at every phase transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptStatusEvent {
    pub id: String,
    pub prompt: String,
    pub status: PromptStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PromptStatusEvent {
    /// Snapshot the record as it stands right now.
    pub fn from_record(record: &PromptRecord) -> Self {
        Self {
            id: record.id.clone(),
            prompt: record.prompt.clone(),
            status: record.status,
            answer: record.answer.clone(),
            processing_time_ms: record.processing_time_ms,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Published on the saved topic once per terminal prompt.
///
/// Kept for consumers that only care that an answer exists, independent of
/// status granularity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSavedEvent {
    pub id: String,
    pub prompt: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl ResponseSavedEvent {
    pub fn from_record(record: &PromptRecord) -> Self {
        Self {
            id: record.id.clone(),
            prompt: record.prompt.clone(),
            answer: record.answer.clone().unwrap_or_default(),
            created_at: record.created_at,
        }
    }
}
