//! Application layer for agent-council
//!
//! This crate contains the use cases, port definitions, and application
//! configuration of the council service. It depends only on the domain
//! layer.

pub mod config;
pub mod ports;
pub mod queue;
pub mod resource_guard;
pub mod topics;
pub mod use_cases;

// Re-export commonly used types
pub use config::CouncilConfig;
pub use ports::{
    broker::{BrokerError, BrokerMessage, MessageBroker, MessageHandler},
    generation::{GenerationError, GenerationGateway},
    memory::{MemoryProbe, MemorySample, ProbeError, ReclaimHook},
    prompt_store::{PromptStore, StoreError},
};
pub use queue::{PromptQueue, QueueParams, QueuedPrompt};
pub use resource_guard::{MemoryThresholds, MemoryVerdict, ResourceGuard};
pub use use_cases::deliberation::{
    DeliberationEngine, DeliberationError, DeliberationOutcome, DeliberationParams,
};
pub use use_cases::intake::{IntakeError, IntakeOutcome, PromptIntake};
pub use use_cases::provision::ensure_participants;
pub use use_cases::worker::{CouncilWorker, WorkerError, WorkerParams};
