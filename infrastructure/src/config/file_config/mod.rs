//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section carries built-in defaults, so a file only needs the
//! keys it overrides; the roster arrays are the one part with no
//! sensible default and are checked by [`FileConfig::validate`].

mod deliberation;
mod memory;
mod ollama;
mod queue;
mod roster;
mod worker;

pub use deliberation::FileDeliberationConfig;
pub use memory::FileMemoryConfig;
pub use ollama::FileOllamaConfig;
pub use queue::FileQueueConfig;
pub use roster::FileParticipantConfig;
pub use worker::FileWorkerConfig;

use serde::{Deserialize, Serialize};

use council_application::CouncilConfig;
use council_domain::Participant;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Generation backend settings
    pub ollama: FileOllamaConfig,
    /// Prompt queue settings
    pub queue: FileQueueConfig,
    /// Deliberation engine settings
    pub deliberation: FileDeliberationConfig,
    /// Worker loop settings
    pub worker: FileWorkerConfig,
    /// Resource guard thresholds
    pub memory: FileMemoryConfig,
    /// Discussion panel roster
    pub members: Vec<FileParticipantConfig>,
    /// Voting panel roster
    pub elites: Vec<FileParticipantConfig>,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected problems.
    ///
    /// An empty result means the config can convene a council.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.members.is_empty() {
            issues.push("members: at least one council member is required".to_string());
        }
        if self.elites.is_empty() {
            issues.push("elites: at least one elite is required".to_string());
        }
        for (section, entries) in [("members", &self.members), ("elites", &self.elites)] {
            for (i, entry) in entries.iter().enumerate() {
                if entry.name.trim().is_empty() {
                    issues.push(format!("{}[{}].name: must not be empty", section, i));
                }
                if entry.model.trim().is_empty() {
                    issues.push(format!("{}[{}].model: must not be empty", section, i));
                }
            }
        }

        if self.ollama.base_url.trim().is_empty() {
            issues.push("ollama.base_url: must not be empty".to_string());
        }

        if self.queue.capacity == 0 {
            issues.push("queue.capacity: must be at least 1".to_string());
        }
        if self.queue.warning_threshold > self.queue.capacity {
            issues.push(format!(
                "queue.warning_threshold ({}) exceeds queue.capacity ({})",
                self.queue.warning_threshold, self.queue.capacity
            ));
        }

        if self.deliberation.statement_warn_chars > self.deliberation.statement_max_chars {
            issues.push(format!(
                "deliberation.statement_warn_chars ({}) exceeds statement_max_chars ({})",
                self.deliberation.statement_warn_chars, self.deliberation.statement_max_chars
            ));
        }

        if self.memory.heap_warning_mb > self.memory.heap_critical_mb {
            issues.push(format!(
                "memory.heap_warning_mb ({}) exceeds heap_critical_mb ({})",
                self.memory.heap_warning_mb, self.memory.heap_critical_mb
            ));
        }
        if self.memory.resident_warning_mb > self.memory.resident_critical_mb {
            issues.push(format!(
                "memory.resident_warning_mb ({}) exceeds resident_critical_mb ({})",
                self.memory.resident_warning_mb, self.memory.resident_critical_mb
            ));
        }

        issues
    }

    /// Convert into the application-level configuration.
    pub fn to_council_config(&self) -> CouncilConfig {
        let members: Vec<Participant> = self.members.iter().map(|m| m.to_member()).collect();
        let elites: Vec<Participant> = self.elites.iter().map(|e| e.to_elite()).collect();

        CouncilConfig::new(members, elites)
            .with_queue(self.queue.to_params())
            .with_deliberation(self.deliberation.to_params())
            .with_worker(self.worker.to_params())
            .with_memory(self.memory.to_thresholds())
    }
}
