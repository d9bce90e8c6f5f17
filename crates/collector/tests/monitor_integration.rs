#![forbid(unsafe_code)]

use collector::{HostIdentity, ProcessMonitor, Supervisor, SysinfoSnapshotSource, SystemClock};
use config::Config;
use std::sync::Arc;
use std::time::Duration;
use tempfile::{TempDir, tempdir};
use tokio_util::sync::CancellationToken;

fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.agent.log_dir = dir.path().join("tmp");
    config.agent.ready_dir = dir.path().join("ready");
    config.agent.debug_dir = dir.path().join("debug");
    config
}

fn audit_lines(dir: &TempDir) -> Vec<String> {
    std::fs::read_dir(dir.path().join("tmp"))
        .unwrap()
        .flat_map(|entry| {
            std::fs::read_to_string(entry.unwrap().path())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

#[test]
fn census_observes_this_process() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir);

    let mut monitor = ProcessMonitor::new(
        &config,
        SysinfoSnapshotSource::new(),
        HostIdentity::resolve(),
        Arc::new(SystemClock),
    )
    .expect("monitor");
    monitor.census().expect("census");

    let own_pid = std::process::id();
    let lines = audit_lines(&dir);
    assert!(!lines.is_empty(), "expected a non-empty startup census");
    assert!(
        lines.iter().any(|line| {
            line.contains("existing process") && line.contains(&format!("| pid: {own_pid} |"))
        }),
        "expected the test process itself in the census"
    );
}

#[tokio::test]
async fn supervised_monitor_runs_until_cancelled() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir);

    let monitor = ProcessMonitor::new(
        &config,
        SysinfoSnapshotSource::new(),
        HostIdentity::resolve(),
        Arc::new(SystemClock),
    )
    .expect("monitor");

    let cancel = CancellationToken::new();
    let mut supervisor = Supervisor::new();
    supervisor.register(Box::new(monitor));
    let handle = tokio::spawn(supervisor.run(cancel.clone()));

    tokio::time::sleep(Duration::from_millis(400)).await;
    cancel.cancel();

    let reports = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("supervisor did not stop after cancellation")
        .expect("supervisor task");
    assert_eq!(reports.len(), 1);
    assert!(reports[0].outcome.is_ok(), "collector reported failure");
    assert!(!audit_lines(&dir).is_empty());
}
