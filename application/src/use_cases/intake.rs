//! Prompt intake
//!
//! Consumes submissions from the inbound topic and turns each one into
//! queued work: validate, reserve a queue slot, persist the `PENDING`
//! record, announce it, enqueue it. The capacity decision comes first
//! so a refused submission leaves no record behind.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use council_domain::{DomainError, PromptRecord, PromptStatusEvent, PromptSubmission};

use crate::ports::broker::{BrokerError, BrokerMessage, MessageBroker, MessageHandler};
use crate::ports::prompt_store::{PromptStore, StoreError};
use crate::queue::{PromptQueue, QueuedPrompt};
use crate::topics;

/// Errors from handling one submission.
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Invalid submission: {0}")]
    Invalid(#[from] DomainError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// What became of a submission.
#[derive(Debug)]
pub enum IntakeOutcome {
    /// Persisted as `PENDING` and queued for the worker.
    Queued(PromptRecord),
    /// Refused at queue capacity; nothing was persisted.
    Dropped,
}

/// The inbound-topic handler.
pub struct PromptIntake {
    queue: Arc<PromptQueue>,
    store: Arc<dyn PromptStore>,
    broker: Arc<dyn MessageBroker>,
}

impl PromptIntake {
    pub fn new(
        queue: Arc<PromptQueue>,
        store: Arc<dyn PromptStore>,
        broker: Arc<dyn MessageBroker>,
    ) -> Self {
        Self {
            queue,
            store,
            broker,
        }
    }

    /// Admit one submission.
    ///
    /// The queue slot is reserved before the record is persisted, then
    /// the persisted item is pushed. The worker only ever dequeues ids
    /// whose records already exist.
    pub async fn handle(
        &self,
        submission: PromptSubmission,
    ) -> Result<IntakeOutcome, IntakeError> {
        submission.validate()?;

        if self.queue.admit().is_err() {
            // The queue already counted and logged the drop.
            return Ok(IntakeOutcome::Dropped);
        }

        let record = self
            .store
            .insert(&submission.prompt, submission.discussion_time_ms)
            .await?;

        let event = PromptStatusEvent::from_record(&record);
        let payload = serde_json::to_value(&event)?;
        self.broker
            .publish(topics::STATUS_CHANGED, &payload, None)
            .await?;

        self.queue.push(QueuedPrompt {
            id: record.id.clone(),
            prompt: record.prompt.clone(),
            discussion_time_ms: record.discussion_time_ms,
        });
        info!(id = %record.id, depth = self.queue.len(), "Prompt queued");
        Ok(IntakeOutcome::Queued(record))
    }

    /// Wrap this intake as a broker subscription handler.
    ///
    /// Malformed payloads and handling errors are logged and swallowed;
    /// the subscription itself never dies.
    pub fn into_handler(self: Arc<Self>) -> MessageHandler {
        Arc::new(move |message: BrokerMessage| {
            let intake = Arc::clone(&self);
            Box::pin(async move {
                let submission: PromptSubmission = match serde_json::from_value(message.payload) {
                    Ok(submission) => submission,
                    Err(e) => {
                        error!(topic = %message.topic, "Discarding malformed submission: {e}");
                        return;
                    }
                };
                if let Err(e) = intake.handle(submission).await {
                    error!("Failed to handle submission: {e}");
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use council_domain::{PromptStatus, PromptUpdate};

    use super::*;
    use crate::queue::QueueParams;

    /// Append-only store; updates are not part of intake.
    struct VecStore {
        records: Mutex<Vec<PromptRecord>>,
    }

    impl VecStore {
        fn new() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
            }
        }

        fn count(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PromptStore for VecStore {
        async fn insert(
            &self,
            prompt: &str,
            discussion_time_ms: Option<u64>,
        ) -> Result<PromptRecord, StoreError> {
            let mut records = self.records.lock().unwrap();
            let record = PromptRecord::new_pending(
                format!("p{}", records.len() + 1),
                prompt,
                discussion_time_ms,
                Utc::now(),
            );
            records.push(record.clone());
            Ok(record)
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<PromptRecord>, StoreError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == id)
                .cloned())
        }

        async fn find_completed_by_prompt(
            &self,
            _prompt: &str,
        ) -> Result<Option<PromptRecord>, StoreError> {
            Ok(None)
        }

        async fn find_by_status(
            &self,
            _status: PromptStatus,
            _limit: usize,
        ) -> Result<Vec<PromptRecord>, StoreError> {
            Ok(vec![])
        }

        async fn list_page(
            &self,
            _offset: usize,
            _limit: usize,
        ) -> Result<Vec<PromptRecord>, StoreError> {
            Ok(vec![])
        }

        async fn update(
            &self,
            id: &str,
            _update: PromptUpdate,
        ) -> Result<PromptRecord, StoreError> {
            Err(StoreError::NotFound(id.to_string()))
        }
    }

    struct RecordingBroker {
        published: Mutex<Vec<(String, serde_json::Value)>>,
    }

    impl RecordingBroker {
        fn new() -> Self {
            Self {
                published: Mutex::new(Vec::new()),
            }
        }

        fn published(&self) -> Vec<(String, serde_json::Value)> {
            self.published.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageBroker for RecordingBroker {
        async fn connect(&self) -> Result<(), BrokerError> {
            Ok(())
        }

        async fn publish(
            &self,
            topic: &str,
            payload: &serde_json::Value,
            _partition_key: Option<&str>,
        ) -> Result<(), BrokerError> {
            self.published
                .lock()
                .unwrap()
                .push((topic.to_string(), payload.clone()));
            Ok(())
        }

        async fn subscribe(
            &self,
            _topic: &str,
            _handler: MessageHandler,
        ) -> Result<(), BrokerError> {
            Ok(())
        }
    }

    struct Fixture {
        queue: Arc<PromptQueue>,
        store: Arc<VecStore>,
        broker: Arc<RecordingBroker>,
        intake: Arc<PromptIntake>,
    }

    fn fixture(params: QueueParams) -> Fixture {
        let queue = Arc::new(PromptQueue::new(params));
        let store = Arc::new(VecStore::new());
        let broker = Arc::new(RecordingBroker::new());
        let intake = Arc::new(PromptIntake::new(
            queue.clone(),
            store.clone() as Arc<dyn PromptStore>,
            broker.clone() as Arc<dyn MessageBroker>,
        ));
        Fixture {
            queue,
            store,
            broker,
            intake,
        }
    }

    #[tokio::test]
    async fn test_submission_is_persisted_announced_and_queued() {
        let fx = fixture(QueueParams::default());
        let submission = PromptSubmission::new("what is rust?").with_discussion_time_ms(500);

        let outcome = fx.intake.handle(submission).await.unwrap();

        let record = match outcome {
            IntakeOutcome::Queued(record) => record,
            IntakeOutcome::Dropped => panic!("submission was dropped"),
        };
        assert_eq!(record.status, PromptStatus::Pending);
        assert_eq!(fx.store.count(), 1);

        let queued = fx.queue.try_dequeue().unwrap();
        assert_eq!(queued.id, record.id);
        assert_eq!(queued.discussion_time_ms, Some(500));

        let published = fx.broker.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, topics::STATUS_CHANGED);
        assert_eq!(published[0].1["status"], "PENDING");
    }

    #[tokio::test]
    async fn test_blank_prompt_is_rejected() {
        let fx = fixture(QueueParams::default());

        let result = fx.intake.handle(PromptSubmission::new("   ")).await;

        assert!(matches!(result, Err(IntakeError::Invalid(_))));
        assert_eq!(fx.store.count(), 0);
        assert!(fx.queue.is_empty());
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_persisting() {
        let fx = fixture(QueueParams::default().with_capacity(1));
        fx.intake
            .handle(PromptSubmission::new("first"))
            .await
            .unwrap();

        let outcome = fx
            .intake
            .handle(PromptSubmission::new("second"))
            .await
            .unwrap();

        assert!(matches!(outcome, IntakeOutcome::Dropped));
        assert_eq!(fx.queue.dropped_count(), 1);
        assert_eq!(fx.store.count(), 1);
        assert_eq!(fx.broker.published().len(), 1);
    }

    #[tokio::test]
    async fn test_handler_accepts_wire_submission() {
        let fx = fixture(QueueParams::default());
        let handler = fx.intake.clone().into_handler();

        handler(BrokerMessage {
            topic: topics::QUEUE.to_string(),
            payload: serde_json::json!({"prompt": "over the wire", "discussionTimeMs": 250}),
            partition_key: None,
        })
        .await;

        assert_eq!(fx.store.count(), 1);
        let queued = fx.queue.try_dequeue().unwrap();
        assert_eq!(queued.prompt, "over the wire");
        assert_eq!(queued.discussion_time_ms, Some(250));
    }

    #[tokio::test]
    async fn test_handler_discards_malformed_payload() {
        let fx = fixture(QueueParams::default());
        let handler = fx.intake.clone().into_handler();

        handler(BrokerMessage {
            topic: topics::QUEUE.to_string(),
            payload: serde_json::json!({"discussionTimeMs": 250}),
            partition_key: None,
        })
        .await;

        assert_eq!(fx.store.count(), 0);
        assert!(fx.queue.is_empty());
    }
}
