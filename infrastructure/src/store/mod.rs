//! Prompt store implementations

pub mod memory;

pub use memory::InMemoryPromptStore;
