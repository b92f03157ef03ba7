//! Ollama backend configuration from TOML (`[ollama]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [ollama]
//! base_url = "http://localhost:11434"
//! timeout_secs = 600
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ollama::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Ollama connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOllamaConfig {
    /// Server address, scheme + host + port
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FileOllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl FileOllamaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
