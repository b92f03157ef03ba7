//! Configuration file loading for agent-council
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./council.toml` or `./.council.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/agent-council/config.toml`
//! 4. Fallback: `~/.config/agent-council/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileDeliberationConfig, FileMemoryConfig, FileOllamaConfig, FileParticipantConfig,
    FileQueueConfig, FileWorkerConfig,
};
pub use loader::{ConfigError, ConfigLoader};
