//! Memory pressure guard
//!
//! Classifies process memory samples against warning and critical
//! thresholds. The worker consults [`ResourceGuard::check`] before every
//! cycle and pauses while the verdict is [`MemoryVerdict::OutOfBounds`];
//! a background task started by [`ResourceGuard::spawn_monitor`] logs
//! usage once per minute so pressure trends show up in the logs before
//! the worker ever stalls.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::ports::memory::{MemoryProbe, MemorySample};

const MIB: u64 = 1024 * 1024;

/// Default monitor cadence.
pub const MONITOR_INTERVAL: Duration = Duration::from_secs(60);

/// Warning and critical limits for the two watched metrics.
///
/// Crossing a critical limit on either metric pushes the verdict to
/// `OUT_OF_BOUNDS`; crossing a warning limit only logs.
#[derive(Debug, Clone, Copy)]
pub struct MemoryThresholds {
    heap_warning_bytes: u64,
    heap_critical_bytes: u64,
    resident_warning_bytes: u64,
    resident_critical_bytes: u64,
}

impl Default for MemoryThresholds {
    fn default() -> Self {
        Self {
            heap_warning_bytes: 400 * MIB,
            heap_critical_bytes: 700 * MIB,
            resident_warning_bytes: 500 * MIB,
            resident_critical_bytes: 900 * MIB,
        }
    }
}

impl MemoryThresholds {
    pub fn heap_warning_bytes(&self) -> u64 {
        self.heap_warning_bytes
    }

    pub fn heap_critical_bytes(&self) -> u64 {
        self.heap_critical_bytes
    }

    pub fn resident_warning_bytes(&self) -> u64 {
        self.resident_warning_bytes
    }

    pub fn resident_critical_bytes(&self) -> u64 {
        self.resident_critical_bytes
    }

    // ==================== Builder Methods ====================

    pub fn with_heap_warning_bytes(mut self, bytes: u64) -> Self {
        self.heap_warning_bytes = bytes;
        self
    }

    pub fn with_heap_critical_bytes(mut self, bytes: u64) -> Self {
        self.heap_critical_bytes = bytes;
        self
    }

    pub fn with_resident_warning_bytes(mut self, bytes: u64) -> Self {
        self.resident_warning_bytes = bytes;
        self
    }

    pub fn with_resident_critical_bytes(mut self, bytes: u64) -> Self {
        self.resident_critical_bytes = bytes;
        self
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryVerdict {
    InBounds,
    OutOfBounds,
}

/// Threshold evaluator over a [`MemoryProbe`].
pub struct ResourceGuard {
    probe: Arc<dyn MemoryProbe>,
    thresholds: MemoryThresholds,
}

impl ResourceGuard {
    pub fn new(probe: Arc<dyn MemoryProbe>, thresholds: MemoryThresholds) -> Self {
        Self { probe, thresholds }
    }

    /// Sample and classify current usage.
    ///
    /// A failing probe cannot be classified; it logs a warning and
    /// reports `InBounds` so the worker keeps running.
    pub async fn check(&self) -> MemoryVerdict {
        match self.probe.sample().await {
            Ok(sample) => evaluate(&sample, &self.thresholds),
            Err(e) => {
                warn!("Memory probe failed: {e}");
                MemoryVerdict::InBounds
            }
        }
    }

    /// Start the periodic usage logger. Runs until `shutdown` fires.
    pub fn spawn_monitor(
        self: &Arc<Self>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let guard = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                match guard.probe.sample().await {
                    Ok(sample) => {
                        info!(
                            heap_mb = sample.heap_bytes.map(|b| b / MIB),
                            resident_mb = sample.resident_bytes / MIB,
                            "Memory usage"
                        );
                        evaluate(&sample, &guard.thresholds);
                    }
                    Err(e) => warn!("Memory probe failed: {e}"),
                }
            }
        })
    }
}

fn evaluate(sample: &MemorySample, thresholds: &MemoryThresholds) -> MemoryVerdict {
    let mut verdict = MemoryVerdict::InBounds;

    if let Some(heap) = sample.heap_bytes {
        if heap >= thresholds.heap_critical_bytes {
            error!(
                heap_mb = heap / MIB,
                limit_mb = thresholds.heap_critical_bytes / MIB,
                "Heap usage critical"
            );
            verdict = MemoryVerdict::OutOfBounds;
        } else if heap >= thresholds.heap_warning_bytes {
            warn!(
                heap_mb = heap / MIB,
                limit_mb = thresholds.heap_warning_bytes / MIB,
                "Heap usage high"
            );
        }
    }

    if sample.resident_bytes >= thresholds.resident_critical_bytes {
        error!(
            resident_mb = sample.resident_bytes / MIB,
            limit_mb = thresholds.resident_critical_bytes / MIB,
            "Resident memory critical"
        );
        verdict = MemoryVerdict::OutOfBounds;
    } else if sample.resident_bytes >= thresholds.resident_warning_bytes {
        warn!(
            resident_mb = sample.resident_bytes / MIB,
            limit_mb = thresholds.resident_warning_bytes / MIB,
            "Resident memory high"
        );
    }

    verdict
}
