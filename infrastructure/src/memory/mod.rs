//! Process memory instrumentation

pub mod probe;

pub use probe::{MallocTrimHook, SysinfoProbe};
