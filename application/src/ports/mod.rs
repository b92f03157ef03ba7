//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod broker;
pub mod generation;
pub mod memory;
pub mod prompt_store;
