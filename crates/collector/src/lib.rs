#![forbid(unsafe_code)]

pub mod clock;
pub mod debug_log;
pub mod error;
pub mod event;
pub mod host;
pub mod monitor;
pub mod snapshot;
pub mod supervisor;
pub mod writer;

pub use clock::{Clock, SystemClock};
pub use debug_log::DebugReporter;
pub use error::Error;
pub use event::{EventKind, ProcessEvent, format_line};
pub use host::HostIdentity;
pub use monitor::ProcessMonitor;
pub use snapshot::{
    Pid, ProcessRecord, ProcessSnapshot, SnapshotDiff, SnapshotSource, SysinfoSnapshotSource, diff,
};
pub use supervisor::{Collector, Supervisor, WorkerReport};
pub use writer::IntervalLogWriter;
