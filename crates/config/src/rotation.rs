#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Rotation {
    /// Wall-clock window one log file covers. The writer closes the current
    /// file and marks it ready as soon as a write lands in a new window.
    /// **Measured in seconds**.
    ///
    /// ## Note
    ///
    /// Windows are aligned to multiples of the granularity since the epoch,
    /// not to collector start time, so files from independent collectors on
    /// the same host cut over at the same instants.
    #[serde_as(as = "serde_with::DurationSeconds")]
    pub granularity: Duration,

    /// How often the running line count is appended to the debug log.
    /// **Measured in seconds**.
    #[serde_as(as = "serde_with::DurationSeconds")]
    pub debug_report_interval: Duration,
}

impl Default for Rotation {
    fn default() -> Self {
        Self {
            granularity: Duration::from_secs(60),
            debug_report_interval: Duration::from_secs(10),
        }
    }
}
