//! Prompt queue configuration from TOML (`[queue]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [queue]
//! capacity = 100
//! warning_threshold = 75
//! ```

use serde::{Deserialize, Serialize};

use council_application::QueueParams;

/// Prompt queue settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileQueueConfig {
    /// Hard cap on queued prompts; submissions past it are dropped
    pub capacity: usize,
    /// Depth at which admissions start logging a warning
    pub warning_threshold: usize,
}

impl Default for FileQueueConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            warning_threshold: 75,
        }
    }
}

impl FileQueueConfig {
    pub fn to_params(&self) -> QueueParams {
        QueueParams::default()
            .with_capacity(self.capacity)
            .with_warning_threshold(self.warning_threshold)
    }
}
