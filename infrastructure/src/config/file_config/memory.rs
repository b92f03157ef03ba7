//! Memory threshold configuration from TOML (`[memory]` section)
//!
//! All values are mebibytes. Warning thresholds log; critical
//! thresholds make the resource guard report out-of-bounds.
//!
//! Example configuration:
//!
//! ```toml
//! [memory]
//! heap_warning_mb = 400
//! heap_critical_mb = 700
//! resident_warning_mb = 500
//! resident_critical_mb = 900
//! ```

use serde::{Deserialize, Serialize};

use council_application::MemoryThresholds;

const MIB: u64 = 1024 * 1024;

/// Resource guard thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMemoryConfig {
    pub heap_warning_mb: u64,
    pub heap_critical_mb: u64,
    pub resident_warning_mb: u64,
    pub resident_critical_mb: u64,
}

impl Default for FileMemoryConfig {
    fn default() -> Self {
        Self {
            heap_warning_mb: 400,
            heap_critical_mb: 700,
            resident_warning_mb: 500,
            resident_critical_mb: 900,
        }
    }
}

impl FileMemoryConfig {
    pub fn to_thresholds(&self) -> MemoryThresholds {
        MemoryThresholds::default()
            .with_heap_warning_bytes(self.heap_warning_mb * MIB)
            .with_heap_critical_bytes(self.heap_critical_mb * MIB)
            .with_resident_warning_bytes(self.resident_warning_mb * MIB)
            .with_resident_critical_bytes(self.resident_critical_mb * MIB)
    }
}
