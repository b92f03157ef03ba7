//! Memory probe port
//!
//! Resource monitoring runs against this trait so the guard logic can be
//! tested with scripted samples. The bundled probe reads process metrics
//! via `sysinfo` (plus glibc heap statistics on Linux).

use async_trait::async_trait;
use thiserror::Error;

/// One snapshot of the process's memory usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySample {
    /// Allocator heap in use, when the platform exposes it.
    pub heap_bytes: Option<u64>,
    /// Resident set size.
    pub resident_bytes: u64,
}

/// Errors surfaced by memory probes.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Process metrics unavailable: {0}")]
    Unavailable(String),
}

/// Abstraction over process memory measurement.
#[async_trait]
pub trait MemoryProbe: Send + Sync {
    async fn sample(&self) -> Result<MemorySample, ProbeError>;
}

/// Optional hook for handing freed memory back to the operating system.
///
/// Invoked by the worker after a memory-pressure pause. Platforms
/// without an explicit reclaim call simply run without one.
pub trait ReclaimHook: Send + Sync {
    fn reclaim(&self);
}
