#![forbid(unsafe_code)]

use crate::clock::Clock;
use crate::debug_log::DebugReporter;
use crate::error::Error;
use crate::event::{EventKind, ProcessEvent, format_line};
use crate::host::HostIdentity;
use crate::snapshot::{Pid, ProcessRecord, ProcessSnapshot, SnapshotSource, diff};
use crate::supervisor::Collector;
use crate::writer::IntervalLogWriter;
use async_trait::async_trait;
use config::{Config, TerminatedPolicy};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// The process-lifecycle collector: an infinite snapshot-diff poll loop over
/// the host process table, writing one audit line per lifecycle event
/// through the interval-rotated writer.
///
/// All state is owned here rather than in module globals, so independent
/// monitors can coexist in one process (the tests rely on this).
pub struct ProcessMonitor<S: SnapshotSource> {
    source: S,
    writer: IntervalLogWriter,
    reporter: DebugReporter,
    host: HostIdentity,
    clock: Arc<dyn Clock>,
    interval: Duration,
    terminated_policy: TerminatedPolicy,
    previous: ProcessSnapshot,
    /// Last-known metadata per live pid. Backs the best-effort terminated
    /// policy: by the time a pid disappears from a snapshot it can no longer
    /// be inspected, so its line is built from what was resolved while it
    /// was alive.
    known: FxHashMap<Pid, ProcessRecord>,
}

impl<S: SnapshotSource> ProcessMonitor<S> {
    pub const NAME: &'static str = "ProcessMonitor";

    pub fn new(
        config: &Config,
        source: S,
        host: HostIdentity,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, Error> {
        let writer = IntervalLogWriter::new(
            config.agent.effective_log_dir(),
            config.agent.ready_dir.clone(),
            Self::NAME,
            config.rotation.granularity,
        )?;
        let reporter = DebugReporter::new(
            config.agent.debug_dir.clone(),
            "process",
            config.rotation.debug_report_interval,
        )?;
        Ok(Self {
            source,
            writer,
            reporter,
            host,
            clock,
            interval: config.process.interval,
            terminated_policy: config.process.terminated,
            previous: ProcessSnapshot::default(),
            known: FxHashMap::default(),
        })
    }

    /// One-time startup pass: log every currently running process as
    /// `existing process` and seed the previous snapshot from the same
    /// capture, so the first diff cycle reports nothing as created.
    pub fn census(&mut self) -> Result<(), Error> {
        let now = self.clock.now();
        self.writer.ensure_current(now)?;

        let snapshot = self.source.snapshot();
        for pid in snapshot.iter() {
            let Some(record) = self.source.resolve(pid) else {
                continue;
            };
            let line = format_line(&ProcessEvent {
                kind: EventKind::Existing,
                timestamp: now.into(),
                host: &self.host,
                record: &record,
            });
            self.writer.write_line(now, &line)?;
            self.known.insert(pid, record);
        }
        self.reporter.maybe_report(now, self.writer.lines_written());
        self.previous = snapshot;
        debug!(
            processes = self.previous.len(),
            lines = self.writer.lines_written(),
            "startup census complete"
        );
        Ok(())
    }

    /// One poll cycle: rotate if due, snapshot, diff, emit created and
    /// terminated events, report liveness. The previous snapshot is only
    /// replaced after every event for the cycle has been dispatched.
    pub fn tick(&mut self) -> Result<(), Error> {
        let now = self.clock.now();
        self.writer.ensure_current(now)?;

        let current = self.source.snapshot();
        let changes = diff(&self.previous, &current);

        for pid in &changes.created {
            // A pid that vanished or became uninspectable before it could be
            // described produces no event this cycle; that race is expected.
            let Some(record) = self.source.resolve(*pid) else {
                continue;
            };
            let line = format_line(&ProcessEvent {
                kind: EventKind::Created,
                timestamp: now.into(),
                host: &self.host,
                record: &record,
            });
            self.writer.write_line(now, &line)?;
            self.known.insert(*pid, record);
        }

        for pid in &changes.terminated {
            let Some(record) = self.known.remove(pid) else {
                continue;
            };
            if self.terminated_policy == TerminatedPolicy::BestEffort {
                let line = format_line(&ProcessEvent {
                    kind: EventKind::Terminated,
                    timestamp: now.into(),
                    host: &self.host,
                    record: &record,
                });
                self.writer.write_line(now, &line)?;
            }
        }

        self.reporter.maybe_report(now, self.writer.lines_written());
        self.previous = current;
        Ok(())
    }

    /// Census, then poll forever on the configured interval until cancelled.
    /// Writer failures propagate out and end the collector; metadata races
    /// never do.
    pub async fn run_until(&mut self, cancel: CancellationToken) -> Result<(), Error> {
        self.census()?;
        info!(interval = ?self.interval, "process monitor started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(
                        lines = self.writer.lines_written(),
                        "process monitor stopping"
                    );
                    break;
                }
                _ = self.clock.sleep(self.interval) => {
                    self.tick()?;
                }
            }
        }
        Ok(())
    }

    /// Total audit lines emitted since startup.
    pub fn lines_written(&self) -> u64 {
        self.writer.lines_written()
    }
}

#[async_trait]
impl<S: SnapshotSource + 'static> Collector for ProcessMonitor<S> {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(mut self: Box<Self>, cancel: CancellationToken) -> Result<(), Error> {
        self.run_until(cancel).await
    }
}
