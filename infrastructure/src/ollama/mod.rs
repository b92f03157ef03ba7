//! Ollama backend adapter

pub mod gateway;
pub mod types;

pub use gateway::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, OllamaGateway};
