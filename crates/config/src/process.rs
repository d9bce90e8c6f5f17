#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;

/// What to do when a pid disappears between two snapshots.
///
/// The process is already gone when the event is emitted, so its metadata can
/// only come from what was resolved while it was still alive. The two
/// variants correspond to the two historically observed behaviors; they
/// materially differ in log completeness, hence an explicit switch rather
/// than a platform default.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TerminatedPolicy {
    /// Emit a `process terminated` line using the last-known metadata for
    /// the pid; skip it if the pid was never resolved while alive.
    #[default]
    BestEffort,

    /// Never emit terminated events. The pid is still dropped from the
    /// tracking state so it can be reported again if the pid is reused.
    Skip,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Process {
    /// Fixed sleep between two poll cycles. **Measured in seconds**,
    /// fractions allowed.
    ///
    /// ## Note
    ///
    /// This bounds event latency, not event loss: a process that starts and
    /// exits entirely within one interval is never observed. Lowering the
    /// interval narrows that window at the cost of more process-table
    /// refreshes.
    #[serde_as(as = "serde_with::DurationSecondsWithFrac<f64>")]
    pub interval: Duration,

    /// Policy for pids that vanished since the previous snapshot.
    pub terminated: TerminatedPolicy,
}

impl Default for Process {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            terminated: TerminatedPolicy::default(),
        }
    }
}
