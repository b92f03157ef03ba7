//! Prompt store port
//!
//! Persistence contract for [`PromptRecord`]s. The worker and the intake
//! handler only ever touch storage through this trait; the bundled
//! adapter keeps records in memory, and a document store can be swapped
//! in without touching the use cases.

use async_trait::async_trait;
use thiserror::Error;

use council_domain::{PromptRecord, PromptStatus, PromptUpdate};

/// Errors surfaced by store adapters.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store error: {0}")]
    Other(String),
}

/// Abstraction over prompt persistence.
///
/// Listing operations order by creation time, newest first.
#[async_trait]
pub trait PromptStore: Send + Sync {
    /// Persist a new record for `prompt` with status `PENDING` and a
    /// store-assigned id. Returns the stored record.
    async fn insert(
        &self,
        prompt: &str,
        discussion_time_ms: Option<u64>,
    ) -> Result<PromptRecord, StoreError>;

    /// Fetch one record by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<PromptRecord>, StoreError>;

    /// Deduplication lookup: a `COMPLETED` record whose prompt text
    /// matches `prompt` exactly, if any.
    async fn find_completed_by_prompt(
        &self,
        prompt: &str,
    ) -> Result<Option<PromptRecord>, StoreError>;

    /// Up to `limit` records with the given status, newest first.
    async fn find_by_status(
        &self,
        status: PromptStatus,
        limit: usize,
    ) -> Result<Vec<PromptRecord>, StoreError>;

    /// One page of records, newest first, skipping `offset` records.
    async fn list_page(&self, offset: usize, limit: usize)
        -> Result<Vec<PromptRecord>, StoreError>;

    /// Apply the populated fields of `update` to the record with this
    /// id and bump its `updated_at`. Returns the updated record.
    async fn update(&self, id: &str, update: PromptUpdate) -> Result<PromptRecord, StoreError>;
}
