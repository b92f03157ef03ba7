//! Deliberation configuration from TOML (`[deliberation]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [deliberation]
//! discussion_time_secs = 420
//! statement_max_chars = 5000
//! statement_warn_chars = 4000
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use council_application::DeliberationParams;
use council_domain::StatementLimits;

/// Deliberation engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDeliberationConfig {
    /// Discussion budget in seconds when a submission carries no override
    pub discussion_time_secs: u64,
    /// Hard cap on statement length; longer responses are truncated
    pub statement_max_chars: usize,
    /// Length past which a statement is logged as near the cap
    pub statement_warn_chars: usize,
}

impl Default for FileDeliberationConfig {
    fn default() -> Self {
        Self {
            discussion_time_secs: 420,
            statement_max_chars: 5000,
            statement_warn_chars: 4000,
        }
    }
}

impl FileDeliberationConfig {
    pub fn to_params(&self) -> DeliberationParams {
        DeliberationParams::default()
            .with_default_discussion_time(Duration::from_secs(self.discussion_time_secs))
            .with_limits(StatementLimits {
                max_chars: self.statement_max_chars,
                warn_chars: self.statement_warn_chars,
            })
    }
}
