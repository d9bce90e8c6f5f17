#![forbid(unsafe_code)]

use crate::host::HostIdentity;
use crate::snapshot::ProcessRecord;
use chrono::{DateTime, Local};
use std::fmt;

/// Sentinel for fields that could not be resolved.
pub const UNKNOWN_FIELD: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Logged once per running process during the startup census.
    Existing,
    Created,
    Terminated,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Existing => f.write_str("existing process"),
            Self::Created => f.write_str("process created"),
            Self::Terminated => f.write_str("process terminated"),
        }
    }
}

/// One lifecycle observation, produced per pid per cycle and consumed by
/// [`format_line`] immediately; never retained.
#[derive(Debug, Clone)]
pub struct ProcessEvent<'a> {
    pub kind: EventKind,
    pub timestamp: DateTime<Local>,
    pub host: &'a HostIdentity,
    pub record: &'a ProcessRecord,
}

/// Render one pipe-delimited audit line.
///
/// Key order is a wire contract: downstream log parsers tokenize these lines
/// positionally, so fields must not be added, dropped, or reordered within a
/// deployment.
pub fn format_line(event: &ProcessEvent<'_>) -> String {
    let record = event.record;
    let user = record.user.as_deref().unwrap_or(UNKNOWN_FIELD);
    let ppid = record
        .parent_pid
        .map(|pid| pid.to_string())
        .unwrap_or_else(|| UNKNOWN_FIELD.to_string());
    let parent = record.parent_name.as_deref().unwrap_or(UNKNOWN_FIELD);
    format!(
        "timestamp: {} | hostname: {} | username: {} | event: {} | pid: {} | name: {} | ppid: {} | parent: {} | {}: {}",
        event.timestamp.format("%Y-%m-%d %H:%M:%S"),
        event.host.hostname,
        user,
        event.kind,
        record.pid,
        record.name,
        ppid,
        parent,
        event.host.id_key,
        event.host.id,
    )
}
