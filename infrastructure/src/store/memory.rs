//! In-memory prompt store
//!
//! [`InMemoryPromptStore`] keeps records in a `Vec` behind a
//! `tokio::sync::RwLock`. Insertion order doubles as creation order, so
//! the newest-first listings just iterate in reverse. Suitable for a
//! single-process deployment; a document store can replace it behind
//! the same port.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use council_application::ports::prompt_store::{PromptStore, StoreError};
use council_domain::{PromptRecord, PromptStatus, PromptUpdate};

/// Prompt store backed by process memory.
pub struct InMemoryPromptStore {
    records: RwLock<Vec<PromptRecord>>,
    seq: AtomicU64,
}

impl InMemoryPromptStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            seq: AtomicU64::new(0),
        }
    }

    /// Millis timestamp plus a process-local counter, hex-encoded.
    /// Unique within the process and roughly sortable by creation time.
    fn next_id(&self) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        format!("{:x}{:04x}", millis, seq)
    }
}

impl Default for InMemoryPromptStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PromptStore for InMemoryPromptStore {
    async fn insert(
        &self,
        prompt: &str,
        discussion_time_ms: Option<u64>,
    ) -> Result<PromptRecord, StoreError> {
        let record =
            PromptRecord::new_pending(self.next_id(), prompt, discussion_time_ms, Utc::now());
        let mut records = self.records.write().await;
        records.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<PromptRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn find_completed_by_prompt(
        &self,
        prompt: &str,
    ) -> Result<Option<PromptRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.status == PromptStatus::Completed && r.prompt == prompt)
            .cloned())
    }

    async fn find_by_status(
        &self,
        status: PromptStatus,
        limit: usize,
    ) -> Result<Vec<PromptRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .filter(|r| r.status == status)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PromptRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update(&self, id: &str, update: PromptUpdate) -> Result<PromptRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(answer) = update.answer {
            record.answer = Some(answer);
        }
        if let Some(votes) = update.votes {
            record.votes = Some(votes);
        }
        if let Some(ms) = update.processing_time_ms {
            record.processing_time_ms = Some(ms);
        }
        record.updated_at = Utc::now();

        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_creates_pending_records_with_unique_ids() {
        let store = InMemoryPromptStore::new();
        let first = store.insert("what is rust?", None).await.unwrap();
        let second = store.insert("what is rust?", Some(1000)).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.status, PromptStatus::Pending);
        assert_eq!(first.discussion_time_ms, None);
        assert_eq!(second.discussion_time_ms, Some(1000));
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let store = InMemoryPromptStore::new();
        let inserted = store.insert("hello", None).await.unwrap();

        let found = store.find_by_id(&inserted.id).await.unwrap();
        assert_eq!(found.map(|r| r.prompt), Some("hello".to_string()));

        let missing = store.find_by_id("nope").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_dedup_matches_exact_completed_prompt_only() {
        let store = InMemoryPromptStore::new();
        let pending = store.insert("what is rust?", None).await.unwrap();

        // Still PENDING: no dedup hit yet.
        assert!(
            store
                .find_completed_by_prompt("what is rust?")
                .await
                .unwrap()
                .is_none()
        );

        store
            .update(
                &pending.id,
                PromptUpdate::status(PromptStatus::Processing),
            )
            .await
            .unwrap();
        store
            .update(
                &pending.id,
                PromptUpdate::status(PromptStatus::Completed).with_answer("a language"),
            )
            .await
            .unwrap();

        let hit = store
            .find_completed_by_prompt("what is rust?")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, pending.id);
        assert_eq!(hit.answer.as_deref(), Some("a language"));

        // Exact match only.
        assert!(
            store
                .find_completed_by_prompt("What is Rust?")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_dedup_returns_oldest_completed_match() {
        let store = InMemoryPromptStore::new();
        let first = store.insert("same", None).await.unwrap();
        let second = store.insert("same", None).await.unwrap();
        for record in [&first, &second] {
            store
                .update(
                    &record.id,
                    PromptUpdate::status(PromptStatus::Completed).with_answer("x"),
                )
                .await
                .unwrap();
        }

        let hit = store.find_completed_by_prompt("same").await.unwrap().unwrap();
        assert_eq!(hit.id, first.id);
    }

    #[tokio::test]
    async fn test_find_by_status_newest_first_with_limit() {
        let store = InMemoryPromptStore::new();
        for i in 0..4 {
            store.insert(&format!("p{}", i), None).await.unwrap();
        }

        let pending = store
            .find_by_status(PromptStatus::Pending, 3)
            .await
            .unwrap();
        let prompts: Vec<_> = pending.iter().map(|r| r.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["p3", "p2", "p1"]);

        let completed = store
            .find_by_status(PromptStatus::Completed, 10)
            .await
            .unwrap();
        assert!(completed.is_empty());
    }

    #[tokio::test]
    async fn test_list_page_skips_and_limits_newest_first() {
        let store = InMemoryPromptStore::new();
        for i in 0..5 {
            store.insert(&format!("p{}", i), None).await.unwrap();
        }

        let page = store.list_page(1, 2).await.unwrap();
        let prompts: Vec<_> = page.iter().map(|r| r.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["p3", "p2"]);

        let past_end = store.list_page(10, 5).await.unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn test_update_applies_fields_and_bumps_updated_at() {
        let store = InMemoryPromptStore::new();
        let record = store.insert("q", None).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = store
            .update(
                &record.id,
                PromptUpdate::status(PromptStatus::Completed)
                    .with_answer("a")
                    .with_votes(2)
                    .with_processing_time_ms(1234),
            )
            .await
            .unwrap();

        assert_eq!(updated.status, PromptStatus::Completed);
        assert_eq!(updated.answer.as_deref(), Some("a"));
        assert_eq!(updated.votes, Some(2));
        assert_eq!(updated.processing_time_ms, Some(1234));
        assert!(updated.updated_at > updated.created_at);
        // Untouched fields survive.
        assert_eq!(updated.prompt, "q");
        assert_eq!(updated.created_at, record.created_at);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let store = InMemoryPromptStore::new();
        let err = store
            .update("missing", PromptUpdate::status(PromptStatus::Processing))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
