#![forbid(unsafe_code)]

use rustc_hash::FxHashSet;
use sysinfo::{System, Users};

pub type Pid = u32;

/// The set of live pids captured at one instant. Immutable once captured;
/// each poll cycle produces a fresh snapshot that supersedes the previous
/// one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSnapshot {
    pids: FxHashSet<Pid>,
}

impl ProcessSnapshot {
    pub fn contains(&self, pid: Pid) -> bool {
        self.pids.contains(&pid)
    }

    pub fn len(&self) -> usize {
        self.pids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Pid> + '_ {
        self.pids.iter().copied()
    }
}

impl FromIterator<Pid> for ProcessSnapshot {
    fn from_iter<I: IntoIterator<Item = Pid>>(iter: I) -> Self {
        Self {
            pids: iter.into_iter().collect(),
        }
    }
}

/// Best-effort metadata for one pid, resolved while the process was alive.
/// Missing parent fields degrade to sentinels at format time; they never
/// fail the record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: Pid,
    pub name: String,
    pub user: Option<String>,
    pub parent_pid: Option<Pid>,
    pub parent_name: Option<String>,
}

/// Pids that appeared and disappeared between two consecutive snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub created: FxHashSet<Pid>,
    pub terminated: FxHashSet<Pid>,
}

/// `created = current - previous`, `terminated = previous - current`.
/// Operates purely on identifiers; whether metadata is still resolvable for
/// any of them is the caller's problem.
pub fn diff(previous: &ProcessSnapshot, current: &ProcessSnapshot) -> SnapshotDiff {
    SnapshotDiff {
        created: current
            .iter()
            .filter(|pid| !previous.contains(*pid))
            .collect(),
        terminated: previous
            .iter()
            .filter(|pid| !current.contains(*pid))
            .collect(),
    }
}

pub trait SnapshotSource: Send {
    /// Capture the current set of live pids.
    fn snapshot(&mut self) -> ProcessSnapshot;

    /// Resolve metadata for one pid against the most recent snapshot.
    ///
    /// `None` means the process vanished between enumeration and inspection
    /// or cannot be inspected by this user. Both are expected races, not
    /// errors; the caller skips the pid for the cycle.
    fn resolve(&mut self, pid: Pid) -> Option<ProcessRecord>;
}

/// Cross-platform snapshot source backed by the sysinfo process table.
pub struct SysinfoSnapshotSource {
    sys: System,
    users: Users,
}

impl SysinfoSnapshotSource {
    pub fn new() -> Self {
        Self {
            sys: System::new(),
            users: Users::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoSnapshotSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSource for SysinfoSnapshotSource {
    fn snapshot(&mut self) -> ProcessSnapshot {
        self.sys.refresh_processes();
        self.sys.processes().keys().map(|pid| pid.as_u32()).collect()
    }

    fn resolve(&mut self, pid: Pid) -> Option<ProcessRecord> {
        let process = self.sys.process(sysinfo::Pid::from_u32(pid))?;
        let name = match process.name() {
            "" => "Unknown".to_string(),
            name => name.to_string(),
        };
        let user = process
            .user_id()
            .and_then(|uid| self.users.get_user_by_id(uid))
            .map(|user| user.name().to_string());
        let parent_pid = process.parent().map(|parent| parent.as_u32());
        // Parent lookup is independent: a vanished parent degrades the two
        // parent fields, it does not block the record.
        let parent_name = parent_pid
            .and_then(|parent| self.sys.process(sysinfo::Pid::from_u32(parent)))
            .map(|parent| parent.name().to_string());
        Some(ProcessRecord {
            pid,
            name,
            user,
            parent_pid,
            parent_name,
        })
    }
}
