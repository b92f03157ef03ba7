//! Top-level council configuration.

use council_domain::Participant;

use crate::queue::QueueParams;
use crate::resource_guard::MemoryThresholds;
use crate::use_cases::deliberation::DeliberationParams;
use crate::use_cases::worker::WorkerParams;

/// Everything the service needs to convene a council: the roster plus
/// the tuning knobs of each component.
///
/// The roster is mandatory; every other section defaults to the
/// built-in values and is overridden piecemeal by the configuration
/// loader.
#[derive(Debug, Clone)]
pub struct CouncilConfig {
    queue: QueueParams,
    deliberation: DeliberationParams,
    worker: WorkerParams,
    memory: MemoryThresholds,
    members: Vec<Participant>,
    elites: Vec<Participant>,
}

impl CouncilConfig {
    pub fn new(members: Vec<Participant>, elites: Vec<Participant>) -> Self {
        Self {
            queue: QueueParams::default(),
            deliberation: DeliberationParams::default(),
            worker: WorkerParams::default(),
            memory: MemoryThresholds::default(),
            members,
            elites,
        }
    }

    pub fn queue(&self) -> QueueParams {
        self.queue
    }

    pub fn deliberation(&self) -> DeliberationParams {
        self.deliberation
    }

    pub fn worker(&self) -> WorkerParams {
        self.worker
    }

    pub fn memory(&self) -> MemoryThresholds {
        self.memory
    }

    pub fn members(&self) -> &[Participant] {
        &self.members
    }

    pub fn elites(&self) -> &[Participant] {
        &self.elites
    }

    /// The full roster, members first.
    pub fn roster(&self) -> Vec<Participant> {
        self.members
            .iter()
            .chain(self.elites.iter())
            .cloned()
            .collect()
    }

    // ==================== Builder Methods ====================

    pub fn with_queue(mut self, queue: QueueParams) -> Self {
        self.queue = queue;
        self
    }

    pub fn with_deliberation(mut self, deliberation: DeliberationParams) -> Self {
        self.deliberation = deliberation;
        self
    }

    pub fn with_worker(mut self, worker: WorkerParams) -> Self {
        self.worker = worker;
        self
    }

    pub fn with_memory(mut self, memory: MemoryThresholds) -> Self {
        self.memory = memory;
        self
    }
}
