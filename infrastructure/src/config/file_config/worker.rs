//! Worker configuration from TOML (`[worker]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [worker]
//! max_consecutive_errors = 5
//! backoff_base_ms = 1000
//! backoff_cap_ms = 30000
//! circuit_breaker_pause_secs = 60
//! guard_pause_secs = 30
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use council_application::WorkerParams;

/// Worker loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWorkerConfig {
    /// Consecutive failures that trip the circuit breaker
    pub max_consecutive_errors: u32,
    /// First backoff delay; doubles per consecutive failure
    pub backoff_base_ms: u64,
    /// Upper bound on the doubling backoff
    pub backoff_cap_ms: u64,
    /// How long the tripped breaker stays open
    pub circuit_breaker_pause_secs: u64,
    /// Pause after the resource guard reports memory out of bounds
    pub guard_pause_secs: u64,
}

impl Default for FileWorkerConfig {
    fn default() -> Self {
        Self {
            max_consecutive_errors: 5,
            backoff_base_ms: 1000,
            backoff_cap_ms: 30_000,
            circuit_breaker_pause_secs: 60,
            guard_pause_secs: 30,
        }
    }
}

impl FileWorkerConfig {
    pub fn to_params(&self) -> WorkerParams {
        WorkerParams::default()
            .with_max_consecutive_errors(self.max_consecutive_errors)
            .with_backoff_base_ms(self.backoff_base_ms)
            .with_backoff_cap_ms(self.backoff_cap_ms)
            .with_circuit_breaker_pause(Duration::from_secs(self.circuit_breaker_pause_secs))
            .with_guard_pause(Duration::from_secs(self.guard_pause_secs))
    }
}
