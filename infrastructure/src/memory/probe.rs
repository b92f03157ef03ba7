//! Process memory probe
//!
//! [`SysinfoProbe`] implements the [`MemoryProbe`] port: resident set
//! size comes from `sysinfo`, heap usage from glibc's `mallinfo2` where
//! that exists. The sysinfo refresh does blocking procfs reads, so it
//! runs on the blocking thread pool.
//!
//! [`MallocTrimHook`] is the matching [`ReclaimHook`]: after a
//! memory-pressure pause it asks glibc to return freed arena pages to
//! the operating system.

use async_trait::async_trait;
use sysinfo::{Process, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};
use tracing::debug;

use council_application::ports::memory::{MemoryProbe, MemorySample, ProbeError, ReclaimHook};

/// [`MemoryProbe`] backed by `sysinfo` and glibc.
pub struct SysinfoProbe;

impl SysinfoProbe {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryProbe for SysinfoProbe {
    async fn sample(&self) -> Result<MemorySample, ProbeError> {
        let resident_bytes = tokio::task::spawn_blocking(resident_bytes)
            .await
            .map_err(|e| ProbeError::Unavailable(format!("probe task failed: {}", e)))??;

        Ok(MemorySample {
            heap_bytes: heap_bytes(),
            resident_bytes,
        })
    }
}

/// Resident set size of this process, in bytes.
fn resident_bytes() -> Result<u64, ProbeError> {
    let pid = sysinfo::get_current_pid()
        .map_err(|e| ProbeError::Unavailable(format!("pid lookup failed: {}", e)))?;

    let mut system = System::new_with_specifics(RefreshKind::nothing());
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        false,
        ProcessRefreshKind::nothing().with_memory(),
    );

    system
        .process(pid)
        .map(Process::memory)
        .ok_or_else(|| ProbeError::Unavailable("own process not visible".to_string()))
}

/// Bytes currently allocated on the glibc heap.
#[cfg(all(target_os = "linux", target_env = "gnu"))]
fn heap_bytes() -> Option<u64> {
    // mallinfo2 covers the glibc main arena and mmapped allocations.
    let info = unsafe { libc::mallinfo2() };
    Some(info.uordblks as u64)
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
fn heap_bytes() -> Option<u64> {
    None
}

/// [`ReclaimHook`] that trims the glibc allocator.
pub struct MallocTrimHook;

impl ReclaimHook for MallocTrimHook {
    fn reclaim(&self) {
        #[cfg(all(target_os = "linux", target_env = "gnu"))]
        {
            // Returns 1 when pages were actually released.
            let released = unsafe { libc::malloc_trim(0) };
            debug!(released, "malloc_trim completed");
        }
        #[cfg(not(all(target_os = "linux", target_env = "gnu")))]
        debug!("No allocator trim available on this platform");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sample_reports_nonzero_resident_memory() {
        let probe = SysinfoProbe::new();
        let sample = probe.sample().await.unwrap();
        // A running test binary always has pages resident.
        assert!(sample.resident_bytes > 0);
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[tokio::test]
    async fn test_sample_reports_heap_on_glibc() {
        let probe = SysinfoProbe::new();
        let sample = probe.sample().await.unwrap();
        assert!(sample.heap_bytes.is_some());
    }

    #[test]
    fn test_reclaim_hook_is_safe_to_invoke() {
        MallocTrimHook.reclaim();
    }
}
