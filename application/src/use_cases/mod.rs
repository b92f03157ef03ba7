//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod deliberation;
pub mod intake;
pub mod provision;
pub mod worker;
