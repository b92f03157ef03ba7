//! Infrastructure layer for agent-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod broker;
pub mod config;
pub mod memory;
pub mod ollama;
pub mod store;

// Re-export commonly used types
pub use broker::ChannelBroker;
pub use config::{ConfigError, ConfigLoader, FileConfig};
pub use memory::{MallocTrimHook, SysinfoProbe};
pub use ollama::OllamaGateway;
pub use store::InMemoryPromptStore;
