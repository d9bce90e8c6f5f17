use flume::Sender;

/// Operator-facing control events delivered via signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// SIGINT / SIGTERM: cancel the collectors, report, exit.
    Shutdown,
    /// SIGHUP / SIGUSR1: log the active configuration.
    DumpConfig,
}

#[cfg(unix)]
pub async fn wait_for_signal(tx: Sender<SignalEvent>) -> anyhow::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;
    let mut usr1 = signal(SignalKind::user_defined1())?;

    loop {
        let event = tokio::select! {
            _ = interrupt.recv() => SignalEvent::Shutdown,
            _ = terminate.recv() => SignalEvent::Shutdown,
            _ = hangup.recv() => SignalEvent::DumpConfig,
            _ = usr1.recv() => SignalEvent::DumpConfig,
        };
        tx.send_async(event).await?;
    }
}

#[cfg(not(unix))]
pub async fn wait_for_signal(tx: Sender<SignalEvent>) -> anyhow::Result<()> {
    loop {
        tokio::signal::ctrl_c().await?;
        tx.send_async(SignalEvent::Shutdown).await?;
    }
}
