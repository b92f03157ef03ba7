//! Bounded in-memory prompt queue
//!
//! FIFO buffer between the intake handler and the worker. Capacity is
//! hard: once full, further prompts are counted as dropped and refused
//! with no side effects. A [`Notify`] carries the producer-to-consumer
//! wakeup; because `notify_one` stores a permit when nobody is waiting,
//! an enqueue that lands between the consumer's emptiness check and its
//! `await` is never lost.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Default hard capacity.
pub const MAX_QUEUE_SIZE: usize = 100;

/// Default depth at which accepted prompts start logging warnings.
pub const QUEUE_WARNING_THRESHOLD: usize = 75;

/// Queue sizing knobs.
#[derive(Debug, Clone, Copy)]
pub struct QueueParams {
    capacity: usize,
    warning_threshold: usize,
}

impl Default for QueueParams {
    fn default() -> Self {
        Self {
            capacity: MAX_QUEUE_SIZE,
            warning_threshold: QUEUE_WARNING_THRESHOLD,
        }
    }
}

impl QueueParams {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn warning_threshold(&self) -> usize {
        self.warning_threshold
    }

    // ==================== Builder Methods ====================

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_warning_threshold(mut self, threshold: usize) -> Self {
        self.warning_threshold = threshold;
        self
    }
}

/// One queued unit of work. The record behind `id` is already persisted
/// as `PENDING` by the time the item enters the queue.
#[derive(Debug, Clone)]
pub struct QueuedPrompt {
    pub id: String,
    pub prompt: String,
    pub discussion_time_ms: Option<u64>,
}

/// Successful admission, with the depth observed at admission time.
#[derive(Debug, Clone, Copy)]
pub struct Accepted {
    pub depth: usize,
    pub near_capacity: bool,
}

/// Refusal at capacity. The drop has already been counted.
#[derive(Debug, Clone, Copy, Error)]
#[error("prompt queue at capacity ({depth} queued, {dropped_total} dropped so far)")]
pub struct QueueFull {
    pub depth: usize,
    pub dropped_total: u64,
}

/// Bounded FIFO queue with a drop counter.
pub struct PromptQueue {
    items: Mutex<VecDeque<QueuedPrompt>>,
    params: QueueParams,
    dropped: AtomicU64,
    notify: Notify,
}

impl PromptQueue {
    pub fn new(params: QueueParams) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            params,
            dropped: AtomicU64::new(0),
            notify: Notify::new(),
        }
    }

    /// Admit one item if there is room, without enqueueing anything.
    ///
    /// Producers that must persist a record between the capacity
    /// decision and the actual [`push`](Self::push) use this as the
    /// first half of [`enqueue`](Self::enqueue). A refusal counts
    /// toward the drop total.
    pub fn admit(&self) -> Result<Accepted, QueueFull> {
        let depth = self.lock_items().len();
        self.gate(depth)
    }

    /// Append an admitted item and wake the consumer.
    ///
    /// Does not re-check capacity; call [`admit`](Self::admit) first.
    pub fn push(&self, item: QueuedPrompt) {
        self.lock_items().push_back(item);
        self.notify.notify_one();
    }

    /// Admit and append in one step, under a single lock acquisition.
    pub fn enqueue(&self, item: QueuedPrompt) -> Result<Accepted, QueueFull> {
        let mut items = self.lock_items();
        let accepted = self.gate(items.len())?;
        items.push_back(item);
        drop(items);
        self.notify.notify_one();
        Ok(accepted)
    }

    /// Remove and return the oldest item, waiting if the queue is empty.
    pub async fn dequeue(&self) -> QueuedPrompt {
        loop {
            if let Some(item) = self.lock_items().pop_front() {
                return item;
            }
            self.notify.notified().await;
        }
    }

    /// Remove and return the oldest item if one is ready.
    pub fn try_dequeue(&self) -> Option<QueuedPrompt> {
        self.lock_items().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock_items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_items().is_empty()
    }

    /// Total prompts refused at capacity since startup.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn gate(&self, depth: usize) -> Result<Accepted, QueueFull> {
        if depth >= self.params.capacity {
            let dropped_total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(
                depth,
                capacity = self.params.capacity,
                dropped_total,
                "Prompt queue full, dropping prompt"
            );
            return Err(QueueFull {
                depth,
                dropped_total,
            });
        }
        let near_capacity = depth >= self.params.warning_threshold;
        if near_capacity {
            let percent_full = (depth as f64 / self.params.capacity as f64) * 100.0;
            warn!(
                depth,
                capacity = self.params.capacity,
                percent_full = format!("{percent_full:.0}%"),
                "Prompt queue nearing capacity"
            );
        } else {
            debug!(depth, "Prompt admitted to queue");
        }
        Ok(Accepted {
            depth,
            near_capacity,
        })
    }

    fn lock_items(&self) -> std::sync::MutexGuard<'_, VecDeque<QueuedPrompt>> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
