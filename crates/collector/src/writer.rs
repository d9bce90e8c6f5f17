#![forbid(unsafe_code)]

use crate::error::Error;
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Appends audit lines to one file per wall-clock bucket.
///
/// Buckets are aligned to multiples of the granularity since the epoch. When
/// a write lands in a new bucket the current file is closed, a zero-byte
/// readiness marker named after it is placed in the ready directory, and a
/// fresh file is opened, all before the line is written. A downstream
/// shipper that only picks up marked files therefore never reads a file
/// still being appended to. The file of the active bucket is deliberately
/// left unmarked on process exit: it may be incomplete.
pub struct IntervalLogWriter {
    log_dir: PathBuf,
    ready_dir: PathBuf,
    collector: String,
    granularity_secs: u64,
    current: Option<OpenLog>,
    lines_written: u64,
}

struct OpenLog {
    file: File,
    bucket: u64,
    path: PathBuf,
}

impl IntervalLogWriter {
    /// Create the log and ready directories and an idle writer. The first
    /// write opens the first file. Directory creation failure is fatal for
    /// the collector.
    pub fn new(
        log_dir: impl Into<PathBuf>,
        ready_dir: impl Into<PathBuf>,
        collector: impl Into<String>,
        granularity: Duration,
    ) -> Result<Self, Error> {
        let log_dir = log_dir.into();
        let ready_dir = ready_dir.into();
        std::fs::create_dir_all(&log_dir)?;
        std::fs::create_dir_all(&ready_dir)?;
        Ok(Self {
            log_dir,
            ready_dir,
            collector: collector.into(),
            granularity_secs: granularity.as_secs().max(1),
            current: None,
            lines_written: 0,
        })
    }

    /// Rotate if `now` falls outside the bucket of the open file, opening
    /// the first file if none is open yet.
    pub fn ensure_current(&mut self, now: SystemTime) -> Result<(), Error> {
        let bucket = self.bucket_index(now);
        match &self.current {
            Some(open) if open.bucket == bucket => Ok(()),
            _ => self.rotate(bucket),
        }
    }

    /// Append one newline-terminated line, rotating first if the bucket has
    /// advanced. The line counter only advances on success.
    pub fn write_line(&mut self, now: SystemTime, line: &str) -> Result<(), Error> {
        self.ensure_current(now)?;
        if let Some(open) = self.current.as_mut() {
            open.file.write_all(line.as_bytes())?;
            open.file.write_all(b"\n")?;
            self.lines_written += 1;
        }
        Ok(())
    }

    /// Total lines written since startup. Never reset.
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Path of the file currently being appended to, if any.
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|open| open.path.as_path())
    }

    fn bucket_index(&self, now: SystemTime) -> u64 {
        let epoch_secs = now
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        epoch_secs / self.granularity_secs
    }

    fn file_name(&self, bucket: u64) -> String {
        let start = UNIX_EPOCH + Duration::from_secs(bucket * self.granularity_secs);
        let local: DateTime<Local> = start.into();
        format!("{}-{}.log", self.collector, local.format("%Y%m%d-%H%M%S"))
    }

    fn rotate(&mut self, bucket: u64) -> Result<(), Error> {
        if let Some(open) = self.current.take() {
            let mut file = open.file;
            file.flush()?;
            drop(file);
            // Marker goes down before the successor opens, so a shipper
            // polling the ready directory can never observe the new bucket
            // without the old file being complete.
            if let Some(name) = open.path.file_name().and_then(|name| name.to_str()) {
                let marker = self.ready_dir.join(format!("{name}.ready"));
                File::create(&marker)?;
                debug!(log = ?open.path, marker = ?marker, "marked log file ready");
            }
        }

        let path = self.log_dir.join(self.file_name(bucket));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!(path = ?path, bucket, "opened log file");
        self.current = Some(OpenLog { file, bucket, path });
        Ok(())
    }
}
