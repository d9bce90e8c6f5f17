mod cli;
mod signals;

use crate::cli::Cli;
use crate::signals::{SignalEvent, wait_for_signal};
use clap::Parser;
use collector::{
    HostIdentity, ProcessMonitor, Supervisor, SysinfoSnapshotSource, SystemClock, WorkerReport,
};
use config::Config;
use flume::bounded;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // NOTE: The verbosity flag takes precedence over the environment variable
    // for log control. The environment variable (`PROCWATCH_LOG`) can only
    // set the log level per crate, not override the verbosity flag. Eg.
    // `PROCWATCH_LOG=collector=warn procwatch -vvv` will log at the trace
    // level for all crates except `collector` which will log at warn.
    let env_filter = EnvFilter::builder()
        .with_env_var("PROCWATCH_LOG")
        .from_env()?
        .add_directive(cli.verbosity.log_level_filter().as_str().parse()?);

    let layer = tracing_subscriber::fmt::layer()
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter)
        .init();

    // load config
    let mut config = match &cli.conffile {
        Some(path) => Config::load(path)?,
        _ => {
            let mut candidates = glob::glob("/etc/procwatch/config.d/*.toml")?
                .filter_map(Result::ok)
                .collect::<Vec<_>>();
            candidates.insert(0, "/etc/procwatch/config.toml".into());
            trace!(?candidates, "config file candidates");
            Config::load_multiple(candidates)?
        }
    };
    if let Some(dir) = &cli.log_dir {
        config.agent.log_dir = dir.clone();
    }
    debug!(?config, ?cli);

    // resolved once, cached for the process lifetime
    let host = HostIdentity::resolve();
    info!(
        hostname = %host.hostname,
        id_key = host.id_key,
        id = %host.id,
        "host identity resolved"
    );

    // install signal handlers
    let (signals_tx, signals_rx) = bounded(8);
    let mut signal_handle = tokio::spawn(async move { wait_for_signal(signals_tx).await });

    // start the collectors under the supervisor
    let cancel = CancellationToken::new();
    let monitor = ProcessMonitor::new(
        &config,
        SysinfoSnapshotSource::new(),
        host,
        Arc::new(SystemClock),
    )?;
    let mut supervisor = Supervisor::new();
    supervisor.register(Box::new(monitor));
    let mut supervisor_handle = tokio::spawn(supervisor.run(cancel.clone()));

    loop {
        tokio::select! {
            // bubble up any errors from the signal handlers
            res = &mut signal_handle => {
                res??;
                anyhow::bail!("signal handler exited unexpectedly");
            }

            // every collector has stopped; summarize and exit
            reports = &mut supervisor_handle => {
                return summarize(&reports?);
            }

            // handle the signal events
            event_res = signals_rx.recv_async() => {
                match event_res? {
                    SignalEvent::Shutdown => {
                        info!("shutdown requested");
                        cancel.cancel();
                    }
                    SignalEvent::DumpConfig => {
                        info!(?config, "current config");
                    }
                }
            }
        }
    }
}

/// Per-collector success/failure summary. A failing collector taints the
/// exit status but never the reporting of its siblings.
fn summarize(reports: &[WorkerReport]) -> anyhow::Result<()> {
    let mut failed = 0usize;
    for report in reports {
        match &report.outcome {
            Ok(()) => info!(collector = %report.name, "collector completed"),
            Err(err) => {
                failed += 1;
                error!(collector = %report.name, %err, "collector failed");
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} collector(s) failed");
    }
    Ok(())
}
