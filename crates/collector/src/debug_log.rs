#![forbid(unsafe_code)]

use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing::warn;

/// Periodically appends the running line count to an out-of-band debug log,
/// so an operator can tell a quiet host from a wedged collector.
///
/// This is a liveness side channel, separate from the audit stream: append
/// failures are warned about and dropped, never propagated.
pub struct DebugReporter {
    path: PathBuf,
    period: Duration,
    last_emit: Option<SystemTime>,
}

impl DebugReporter {
    pub fn new(
        debug_dir: impl Into<PathBuf>,
        collector: &str,
        period: Duration,
    ) -> Result<Self, std::io::Error> {
        let debug_dir = debug_dir.into();
        std::fs::create_dir_all(&debug_dir)?;
        Ok(Self {
            path: debug_dir.join(format!("{collector}-debug.log")),
            period: period.max(Duration::from_secs(1)),
            last_emit: None,
        })
    }

    /// Emit one count line if a full period has elapsed since the last one.
    /// Emits at most once per period boundary no matter how often the poll
    /// loop calls in.
    pub fn maybe_report(&mut self, now: SystemTime, lines_written: u64) {
        let due = match self.last_emit {
            None => true,
            Some(last) => now
                .duration_since(last)
                .map(|elapsed| elapsed >= self.period)
                .unwrap_or(false),
        };
        if !due {
            return;
        }
        self.last_emit = Some(now);
        if let Err(err) = self.append(now, lines_written) {
            warn!(path = ?self.path, %err, "failed to append debug report");
        }
    }

    fn append(&self, now: SystemTime, lines_written: u64) -> Result<(), std::io::Error> {
        let timestamp: DateTime<Local> = now.into();
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(
            file,
            "{} Running total log lines written: {}",
            timestamp.format("%Y-%m-%d %H:%M:%S"),
            lines_written,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;
    use tempfile::tempdir;

    fn at(epoch_secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(epoch_secs)
    }

    fn line_count(path: &std::path::Path) -> usize {
        std::fs::read_to_string(path)
            .map(|text| text.lines().count())
            .unwrap_or(0)
    }

    #[test]
    fn reports_once_per_period() {
        let dir = tempdir().unwrap();
        let mut reporter =
            DebugReporter::new(dir.path(), "process", Duration::from_secs(10)).unwrap();
        let path = dir.path().join("process-debug.log");

        reporter.maybe_report(at(100), 5);
        assert_eq!(line_count(&path), 1);

        // Sub-period calls are suppressed even if repeated.
        reporter.maybe_report(at(103), 6);
        reporter.maybe_report(at(109), 7);
        assert_eq!(line_count(&path), 1);

        reporter.maybe_report(at(110), 8);
        assert_eq!(line_count(&path), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Running total log lines written: 5"));
        assert!(text.contains("Running total log lines written: 8"));
    }
}
