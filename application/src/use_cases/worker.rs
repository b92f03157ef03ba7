//! Council worker loop
//!
//! A single serial consumer drains the [`PromptQueue`]: guard check,
//! dequeue, dedup lookup, deliberation, persistence, events. One prompt
//! is in flight at a time, so queue order is completion order.
//!
//! Failures never kill the loop. Consecutive errors back off
//! exponentially, and a run of them trips a circuit breaker that rests
//! the worker for a full minute before starting fresh.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use council_domain::{
    PromptRecord, PromptStatus, PromptStatusEvent, PromptUpdate, ResponseSavedEvent, preview,
};

use crate::ports::broker::{BrokerError, MessageBroker};
use crate::ports::generation::GenerationGateway;
use crate::ports::memory::ReclaimHook;
use crate::ports::prompt_store::{PromptStore, StoreError};
use crate::queue::{PromptQueue, QueuedPrompt};
use crate::resource_guard::{MemoryVerdict, ResourceGuard};
use crate::topics;
use crate::use_cases::deliberation::{DeliberationEngine, DeliberationError};

/// Worker pacing knobs.
#[derive(Debug, Clone, Copy)]
pub struct WorkerParams {
    max_consecutive_errors: u32,
    backoff_base_ms: u64,
    backoff_cap_ms: u64,
    circuit_breaker_pause: Duration,
    guard_pause: Duration,
}

impl Default for WorkerParams {
    fn default() -> Self {
        Self {
            max_consecutive_errors: 5,
            backoff_base_ms: 1000,
            backoff_cap_ms: 30_000,
            circuit_breaker_pause: Duration::from_secs(60),
            guard_pause: Duration::from_secs(30),
        }
    }
}

impl WorkerParams {
    pub fn max_consecutive_errors(&self) -> u32 {
        self.max_consecutive_errors
    }

    pub fn backoff_base_ms(&self) -> u64 {
        self.backoff_base_ms
    }

    pub fn backoff_cap_ms(&self) -> u64 {
        self.backoff_cap_ms
    }

    pub fn circuit_breaker_pause(&self) -> Duration {
        self.circuit_breaker_pause
    }

    pub fn guard_pause(&self) -> Duration {
        self.guard_pause
    }

    // ==================== Builder Methods ====================

    pub fn with_max_consecutive_errors(mut self, max: u32) -> Self {
        self.max_consecutive_errors = max;
        self
    }

    pub fn with_backoff_base_ms(mut self, base_ms: u64) -> Self {
        self.backoff_base_ms = base_ms;
        self
    }

    pub fn with_backoff_cap_ms(mut self, cap_ms: u64) -> Self {
        self.backoff_cap_ms = cap_ms;
        self
    }

    pub fn with_circuit_breaker_pause(mut self, pause: Duration) -> Self {
        self.circuit_breaker_pause = pause;
        self
    }

    pub fn with_guard_pause(mut self, pause: Duration) -> Self {
        self.guard_pause = pause;
        self
    }
}

/// What the loop should do after a failed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureAction {
    Backoff(Duration),
    CircuitBreak(Duration),
}

/// Consecutive-failure bookkeeping for the loop.
///
/// Each failure doubles the wait (`base * 2^count`, capped); hitting the
/// failure ceiling trips the breaker instead and resets the count, so
/// the run after a breaker rest starts from the shortest backoff again.
#[derive(Debug)]
struct FailureTracker {
    count: u32,
}

impl FailureTracker {
    fn new() -> Self {
        Self { count: 0 }
    }

    fn record_success(&mut self) {
        self.count = 0;
    }

    fn record_failure(&mut self, params: &WorkerParams) -> FailureAction {
        self.count = self.count.saturating_add(1);
        if self.count >= params.max_consecutive_errors {
            self.count = 0;
            return FailureAction::CircuitBreak(params.circuit_breaker_pause);
        }
        let delay_ms = params
            .backoff_base_ms
            .saturating_mul(2u64.saturating_pow(self.count))
            .min(params.backoff_cap_ms);
        FailureAction::Backoff(Duration::from_millis(delay_ms))
    }
}

/// Errors from one processing cycle.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("Deliberation error: {0}")]
    Deliberation(#[from] DeliberationError),
}

/// The serial prompt processor.
pub struct CouncilWorker<G: GenerationGateway> {
    engine: Arc<DeliberationEngine<G>>,
    store: Arc<dyn PromptStore>,
    broker: Arc<dyn MessageBroker>,
    queue: Arc<PromptQueue>,
    guard: Arc<ResourceGuard>,
    reclaim: Option<Arc<dyn ReclaimHook>>,
    params: WorkerParams,
    failures: FailureTracker,
}

impl<G: GenerationGateway> CouncilWorker<G> {
    pub fn new(
        engine: Arc<DeliberationEngine<G>>,
        store: Arc<dyn PromptStore>,
        broker: Arc<dyn MessageBroker>,
        queue: Arc<PromptQueue>,
        guard: Arc<ResourceGuard>,
        reclaim: Option<Arc<dyn ReclaimHook>>,
        params: WorkerParams,
    ) -> Self {
        Self {
            engine,
            store,
            broker,
            queue,
            guard,
            reclaim,
            params,
            failures: FailureTracker::new(),
        }
    }

    /// Drain the queue until `shutdown` fires.
    ///
    /// A prompt already being deliberated is finished before the worker
    /// honors the shutdown.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!("Council worker started");
        loop {
            if self.guard.check().await == MemoryVerdict::OutOfBounds {
                warn!(
                    pause_ms = self.params.guard_pause.as_millis() as u64,
                    "Memory out of bounds, worker pausing"
                );
                if self.pause(&shutdown, self.params.guard_pause).await {
                    break;
                }
                if let Some(hook) = &self.reclaim {
                    hook.reclaim();
                }
                continue;
            }

            let item = tokio::select! {
                _ = shutdown.cancelled() => break,
                item = self.queue.dequeue() => item,
            };

            match self.process(&item).await {
                Ok(()) => self.failures.record_success(),
                Err(e) => {
                    error!(id = %item.id, "Failed to process prompt: {e}");
                    match self.failures.record_failure(&self.params) {
                        FailureAction::Backoff(delay) => {
                            warn!(
                                delay_ms = delay.as_millis() as u64,
                                "Backing off after failure"
                            );
                            if self.pause(&shutdown, delay).await {
                                break;
                            }
                        }
                        FailureAction::CircuitBreak(pause) => {
                            warn!(
                                pause_ms = pause.as_millis() as u64,
                                "Too many consecutive failures, circuit breaker engaged"
                            );
                            if self.pause(&shutdown, pause).await {
                                break;
                            }
                        }
                    }
                }
            }
        }
        info!("Council worker stopped");
    }

    /// Handle one dequeued prompt end to end.
    async fn process(&self, item: &QueuedPrompt) -> Result<(), WorkerError> {
        debug!(id = %item.id, prompt = %preview(&item.prompt, 80), "Processing prompt");

        // An identical prompt already answered is served from storage.
        if let Some(cached) = self.store.find_completed_by_prompt(&item.prompt).await? {
            info!(id = %item.id, source = %cached.id, "Duplicate prompt, serving cached answer");
            let update = PromptUpdate::status(PromptStatus::Cached)
                .with_answer(cached.answer.clone().unwrap_or_default())
                .with_processing_time_ms(0);
            let record = self.store.update(&item.id, update).await?;
            self.publish_status(&record).await?;
            self.publish_saved(&record).await?;
            return Ok(());
        }

        let record = self
            .store
            .update(&item.id, PromptUpdate::status(PromptStatus::Processing))
            .await?;
        self.publish_status(&record).await?;

        let started = Instant::now();
        let budget = item.discussion_time_ms.map(Duration::from_millis);
        let outcome = self.engine.deliberate(&item.prompt, budget).await?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let update = PromptUpdate::status(PromptStatus::Completed)
            .with_answer(outcome.answer)
            .with_votes(outcome.votes)
            .with_processing_time_ms(elapsed_ms);
        let record = self.store.update(&item.id, update).await?;
        self.publish_status(&record).await?;
        self.publish_saved(&record).await?;

        info!(id = %record.id, elapsed_ms, votes = outcome.votes, "Prompt completed");
        Ok(())
    }

    async fn publish_status(&self, record: &PromptRecord) -> Result<(), BrokerError> {
        let event = PromptStatusEvent::from_record(record);
        let payload = serde_json::to_value(&event)?;
        self.broker
            .publish(topics::STATUS_CHANGED, &payload, None)
            .await
    }

    async fn publish_saved(&self, record: &PromptRecord) -> Result<(), BrokerError> {
        let event = ResponseSavedEvent::from_record(record);
        let payload = serde_json::to_value(&event)?;
        self.broker.publish(topics::SAVED, &payload, None).await
    }

    /// Sleep for `pause`, returning `true` if shutdown fired first.
    async fn pause(&self, shutdown: &CancellationToken, pause: Duration) -> bool {
        tokio::select! {
            _ = shutdown.cancelled() => true,
            _ = tokio::time::sleep(pause) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use council_domain::Participant;

    use super::*;
    use crate::ports::generation::GenerationError;
    use crate::ports::memory::{MemoryProbe, MemorySample, ProbeError};
    use crate::queue::QueueParams;
    use crate::resource_guard::MemoryThresholds;
    use crate::use_cases::deliberation::DeliberationParams;

    // ==================== Test doubles ====================

    /// Store over a HashMap, enough to drive the worker.
    struct MapStore {
        records: Mutex<HashMap<String, PromptRecord>>,
        next_id: Mutex<u64>,
        fail_updates: bool,
    }

    impl MapStore {
        fn new() -> Self {
            Self {
                records: Mutex::new(HashMap::new()),
                next_id: Mutex::new(0),
                fail_updates: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail_updates: true,
                ..Self::new()
            }
        }

        fn seed(&self, record: PromptRecord) {
            self.records
                .lock()
                .unwrap()
                .insert(record.id.clone(), record);
        }

        fn get(&self, id: &str) -> PromptRecord {
            self.records.lock().unwrap()[id].clone()
        }
    }

    #[async_trait]
    impl PromptStore for MapStore {
        async fn insert(
            &self,
            prompt: &str,
            discussion_time_ms: Option<u64>,
        ) -> Result<PromptRecord, StoreError> {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let record = PromptRecord::new_pending(
                format!("p{next_id}"),
                prompt,
                discussion_time_ms,
                Utc::now(),
            );
            self.records
                .lock()
                .unwrap()
                .insert(record.id.clone(), record.clone());
            Ok(record)
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<PromptRecord>, StoreError> {
            Ok(self.records.lock().unwrap().get(id).cloned())
        }

        async fn find_completed_by_prompt(
            &self,
            prompt: &str,
        ) -> Result<Option<PromptRecord>, StoreError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .values()
                .find(|r| r.prompt == prompt && r.status == PromptStatus::Completed)
                .cloned())
        }

        async fn find_by_status(
            &self,
            status: PromptStatus,
            limit: usize,
        ) -> Result<Vec<PromptRecord>, StoreError> {
            let mut records: Vec<_> = self
                .records
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.status == status)
                .cloned()
                .collect();
            records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            records.truncate(limit);
            Ok(records)
        }

        async fn list_page(
            &self,
            offset: usize,
            limit: usize,
        ) -> Result<Vec<PromptRecord>, StoreError> {
            let mut records: Vec<_> = self.records.lock().unwrap().values().cloned().collect();
            records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(records.into_iter().skip(offset).take(limit).collect())
        }

        async fn update(
            &self,
            id: &str,
            update: PromptUpdate,
        ) -> Result<PromptRecord, StoreError> {
            if self.fail_updates {
                return Err(StoreError::Unavailable("store offline".to_string()));
            }
            let mut records = self.records.lock().unwrap();
            let record = records
                .get_mut(id)
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

    /// Broker that records every publish.
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

        fn on_topic(&self, topic: &str) -> Vec<serde_json::Value> {
            self.published()
                .into_iter()
                .filter(|(t, _)| t == topic)
                .map(|(_, v)| v)
                .collect()
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
            _handler: crate::ports::broker::MessageHandler,
        ) -> Result<(), BrokerError> {
            Ok(())
        }
    }

    /// Gateway where members echo a fixed statement and elites approve
    /// everything.
    struct EchoGateway {
        answers: HashMap<String, String>,
    }

    impl EchoGateway {
        fn new(answers: &[(&str, &str)]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|(model, answer)| (model.to_string(), answer.to_string()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl GenerationGateway for EchoGateway {
        async fn generate(&self, model: &str, _prompt: &str) -> Result<String, GenerationError> {
            Ok(self
                .answers
                .get(model)
                .cloned()
                .unwrap_or_else(|| "1".to_string()))
        }

        async fn available_models(&self) -> Result<Vec<String>, GenerationError> {
            Ok(vec![])
        }

        async fn pull_model(&self, _model: &str) -> Result<(), GenerationError> {
            Ok(())
        }

        async fn create_persona_model(
            &self,
            _name: &str,
            _base: &str,
            _system: &str,
        ) -> Result<(), GenerationError> {
            Ok(())
        }
    }

    struct QuietProbe;

    #[async_trait]
    impl MemoryProbe for QuietProbe {
        async fn sample(&self) -> Result<MemorySample, ProbeError> {
            Ok(MemorySample {
                heap_bytes: Some(0),
                resident_bytes: 0,
            })
        }
    }

    fn test_engine(gateway: EchoGateway) -> Arc<DeliberationEngine<EchoGateway>> {
        Arc::new(
            DeliberationEngine::new(
                Arc::new(gateway),
                vec![
                    Participant::member("member1", "m1"),
                    Participant::member("member2", "m2"),
                ],
                vec![Participant::elite("elite1", "e1")],
                DeliberationParams::default(),
            )
            .unwrap(),
        )
    }

    struct Fixture {
        store: Arc<MapStore>,
        broker: Arc<RecordingBroker>,
        queue: Arc<PromptQueue>,
        worker: CouncilWorker<EchoGateway>,
    }

    fn fixture_with_store(store: MapStore) -> Fixture {
        let store = Arc::new(store);
        let broker = Arc::new(RecordingBroker::new());
        let queue = Arc::new(PromptQueue::new(QueueParams::default()));
        let guard = Arc::new(ResourceGuard::new(
            Arc::new(QuietProbe),
            MemoryThresholds::default(),
        ));
        let engine = test_engine(EchoGateway::new(&[("m1", "answer one"), ("m2", "answer two")]));
        let worker = CouncilWorker::new(
            engine,
            store.clone() as Arc<dyn PromptStore>,
            broker.clone() as Arc<dyn MessageBroker>,
            queue.clone(),
            guard,
            None,
            WorkerParams::default(),
        );
        Fixture {
            store,
            broker,
            queue,
            worker,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_store(MapStore::new())
    }

    async fn seeded_item(fx: &Fixture, prompt: &str, budget_ms: Option<u64>) -> QueuedPrompt {
        let record = fx.store.insert(prompt, budget_ms).await.unwrap();
        QueuedPrompt {
            id: record.id,
            prompt: prompt.to_string(),
            discussion_time_ms: budget_ms,
        }
    }

    // ==================== Failure pacing ====================

    #[test]
    fn test_backoff_doubles_per_failure() {
        let params = WorkerParams::default();
        let mut tracker = FailureTracker::new();

        assert_eq!(
            tracker.record_failure(&params),
            FailureAction::Backoff(Duration::from_millis(2000))
        );
        assert_eq!(
            tracker.record_failure(&params),
            FailureAction::Backoff(Duration::from_millis(4000))
        );
        assert_eq!(
            tracker.record_failure(&params),
            FailureAction::Backoff(Duration::from_millis(8000))
        );
        assert_eq!(
            tracker.record_failure(&params),
            FailureAction::Backoff(Duration::from_millis(16_000))
        );
    }

    #[test]
    fn test_backoff_caps_at_thirty_seconds() {
        let params = WorkerParams::default().with_max_consecutive_errors(20);
        let mut tracker = FailureTracker::new();
        let mut last = Duration::ZERO;
        for _ in 0..10 {
            if let FailureAction::Backoff(delay) = tracker.record_failure(&params) {
                last = delay;
            }
        }
        assert_eq!(last, Duration::from_millis(30_000));
    }

    #[test]
    fn test_fifth_failure_trips_breaker_and_resets() {
        let params = WorkerParams::default();
        let mut tracker = FailureTracker::new();
        for _ in 0..4 {
            assert!(matches!(
                tracker.record_failure(&params),
                FailureAction::Backoff(_)
            ));
        }
        assert_eq!(
            tracker.record_failure(&params),
            FailureAction::CircuitBreak(Duration::from_secs(60))
        );
        // After the breaker the schedule starts over.
        assert_eq!(
            tracker.record_failure(&params),
            FailureAction::Backoff(Duration::from_millis(2000))
        );
    }

    #[test]
    fn test_success_resets_backoff() {
        let params = WorkerParams::default();
        let mut tracker = FailureTracker::new();
        tracker.record_failure(&params);
        tracker.record_failure(&params);
        tracker.record_success();
        assert_eq!(
            tracker.record_failure(&params),
            FailureAction::Backoff(Duration::from_millis(2000))
        );
    }

    // ==================== Single-cycle processing ====================

    #[tokio::test]
    async fn test_process_completes_a_prompt() {
        let fx = fixture();
        let item = seeded_item(&fx, "what is rust?", Some(50)).await;

        fx.worker.process(&item).await.unwrap();

        let record = fx.store.get(&item.id);
        assert_eq!(record.status, PromptStatus::Completed);
        // Tie between the two members keeps member1's snapshot.
        assert_eq!(record.answer.as_deref(), Some("answer one"));
        assert_eq!(record.votes, Some(1));
        assert!(record.processing_time_ms.unwrap() >= 50);

        let statuses: Vec<String> = fx
            .broker
            .on_topic(topics::STATUS_CHANGED)
            .iter()
            .map(|v| v["status"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(statuses, vec!["PROCESSING", "COMPLETED"]);
        assert_eq!(fx.broker.on_topic(topics::SAVED).len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_prompt_served_from_cache() {
        let fx = fixture();

        let mut completed = PromptRecord::new_pending("earlier", "what is rust?", None, Utc::now());
        completed.status = PromptStatus::Completed;
        completed.answer = Some("a language".to_string());
        fx.store.seed(completed);

        let item = seeded_item(&fx, "what is rust?", Some(50)).await;
        fx.worker.process(&item).await.unwrap();

        let record = fx.store.get(&item.id);
        assert_eq!(record.status, PromptStatus::Cached);
        assert_eq!(record.answer.as_deref(), Some("a language"));
        assert_eq!(record.processing_time_ms, Some(0));

        // No deliberation happened: straight to CACHED, then saved.
        let statuses: Vec<String> = fx
            .broker
            .on_topic(topics::STATUS_CHANGED)
            .iter()
            .map(|v| v["status"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(statuses, vec!["CACHED"]);
        assert_eq!(fx.broker.on_topic(topics::SAVED).len(), 1);
    }

    #[tokio::test]
    async fn test_dedup_requires_exact_prompt_match() {
        let fx = fixture();

        let mut completed = PromptRecord::new_pending("earlier", "what is rust?", None, Utc::now());
        completed.status = PromptStatus::Completed;
        completed.answer = Some("a language".to_string());
        fx.store.seed(completed);

        let item = seeded_item(&fx, "What is Rust?", Some(50)).await;
        fx.worker.process(&item).await.unwrap();

        assert_eq!(fx.store.get(&item.id).status, PromptStatus::Completed);
    }

    #[tokio::test]
    async fn test_process_propagates_store_failure() {
        let fx = fixture_with_store(MapStore::failing());
        let item = QueuedPrompt {
            id: "p1".to_string(),
            prompt: "anything".to_string(),
            discussion_time_ms: Some(10),
        };

        let result = fx.worker.process(&item).await;
        assert!(matches!(result, Err(WorkerError::Store(_))));
    }

    // ==================== Full loop ====================

    #[tokio::test]
    async fn test_run_drains_queue_in_fifo_order() {
        let mut fx = fixture();
        for prompt in ["first?", "second?", "third?"] {
            let item = seeded_item(&fx, prompt, Some(20)).await;
            fx.queue.enqueue(item).unwrap();
        }

        let shutdown = CancellationToken::new();
        let stopper = shutdown.clone();
        let broker = fx.broker.clone();
        let driver = tokio::spawn(async move { fx.worker.run(stopper).await });

        // Wait until all three answers are out, then stop the loop.
        tokio::time::timeout(Duration::from_secs(5), async {
            while broker.on_topic(topics::SAVED).len() < 3 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("worker did not finish the queue");
        shutdown.cancel();
        driver.await.unwrap();

        let prompts: Vec<String> = broker
            .on_topic(topics::SAVED)
            .iter()
            .map(|v| v["prompt"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(prompts, vec!["first?", "second?", "third?"]);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown_while_idle() {
        let mut fx = fixture();
        let shutdown = CancellationToken::new();
        let stopper = shutdown.clone();
        let driver = tokio::spawn(async move { fx.worker.run(stopper).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.cancel();

        tokio::time::timeout(Duration::from_secs(1), driver)
            .await
            .expect("worker did not stop")
            .unwrap();
    }

    // ==================== End to end ====================

    #[tokio::test]
    async fn test_full_pass_respects_discussion_budget() {
        // Two members, one always-approving elite, a one second budget:
        // the recorded processing time covers at least the budget and
        // the answer is the tie-winning first member's statement.
        let mut fx = fixture();
        let item = seeded_item(&fx, "full pass?", Some(1000)).await;
        fx.queue.enqueue(item.clone()).unwrap();

        let shutdown = CancellationToken::new();
        let stopper = shutdown.clone();
        let broker = fx.broker.clone();
        let store = fx.store.clone();
        let driver = tokio::spawn(async move { fx.worker.run(stopper).await });

        tokio::time::timeout(Duration::from_secs(10), async {
            while broker.on_topic(topics::SAVED).is_empty() {
                tokio::time::sleep(Duration::from_millis(25)).await;
            }
        })
        .await
        .expect("prompt was never completed");
        shutdown.cancel();
        driver.await.unwrap();

        let record = store.get(&item.id);
        assert_eq!(record.status, PromptStatus::Completed);
        assert_eq!(record.answer.as_deref(), Some("answer one"));
        assert!(record.processing_time_ms.unwrap() >= 1000);

        let statuses: Vec<String> = broker
            .on_topic(topics::STATUS_CHANGED)
            .iter()
            .map(|v| v["status"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(statuses, vec!["PROCESSING", "COMPLETED"]);
    }
}
