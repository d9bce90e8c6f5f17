#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Agent {
    /// Directory the rotating audit log files are written to. When
    /// [`Agent::database_mode`] is set, `tmp-process` is used instead so a
    /// database shipper and a plain-file shipper never race on the same
    /// directory.
    pub log_dir: PathBuf,

    /// Directory for readiness markers. A zero-byte marker named after a
    /// closed log file tells a downstream shipper that file is complete and
    /// safe to pick up. The currently written file never has a marker.
    pub ready_dir: PathBuf,

    /// Directory for the out-of-band liveness log (running line counts).
    pub debug_dir: PathBuf,

    /// Whether collected logs are destined for database ingestion. Only
    /// affects the effective log directory.
    pub database_mode: bool,
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("tmp"),
            ready_dir: PathBuf::from("ready"),
            debug_dir: PathBuf::from("debuggeneratorlogs"),
            database_mode: false,
        }
    }
}

impl Agent {
    /// The log directory after applying the database-mode switch.
    pub fn effective_log_dir(&self) -> PathBuf {
        if self.database_mode && self.log_dir == Path::new("tmp") {
            PathBuf::from("tmp-process")
        } else {
            self.log_dir.clone()
        }
    }
}
