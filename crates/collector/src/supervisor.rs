#![forbid(unsafe_code)]

use crate::error::Error;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// One long-running telemetry worker. Implementations run their own monitor
/// loop until the token is cancelled.
#[async_trait]
pub trait Collector: Send {
    fn name(&self) -> &str;

    async fn run(self: Box<Self>, cancel: CancellationToken) -> Result<(), Error>;
}

/// Outcome of one supervised worker, reported after it stops.
#[derive(Debug)]
pub struct WorkerReport {
    pub name: String,
    pub outcome: Result<(), String>,
}

/// Starts each registered collector on its own task and waits for all of
/// them. Workers share nothing; a failing or panicking sibling is reported
/// and never halts the rest.
#[derive(Default)]
pub struct Supervisor {
    workers: Vec<Box<dyn Collector>>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, worker: Box<dyn Collector>) {
        self.workers.push(worker);
    }

    pub async fn run(self, cancel: CancellationToken) -> Vec<WorkerReport> {
        let handles: Vec<_> = self
            .workers
            .into_iter()
            .map(|worker| {
                let name = worker.name().to_string();
                let cancel = cancel.clone();
                info!(collector = %name, "starting collector");
                let handle = tokio::spawn(worker.run(cancel));
                (name, handle)
            })
            .collect();

        futures::future::join_all(handles.into_iter().map(|(name, handle)| async move {
            let outcome = match handle.await {
                Ok(Ok(())) => {
                    info!(collector = %name, "collector finished");
                    Ok(())
                }
                Ok(Err(err)) => {
                    error!(collector = %name, %err, "collector failed");
                    Err(err.to_string())
                }
                Err(err) => {
                    error!(collector = %name, %err, "collector panicked");
                    Err(err.to_string())
                }
            };
            WorkerReport { name, outcome }
        }))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Immediate {
        name: &'static str,
        fail: bool,
    }

    #[async_trait]
    impl Collector for Immediate {
        fn name(&self) -> &str {
            self.name
        }

        async fn run(self: Box<Self>, _cancel: CancellationToken) -> Result<(), Error> {
            if self.fail {
                Err(Error::Io(std::io::Error::other("target unavailable")))
            } else {
                Ok(())
            }
        }
    }

    struct Panics;

    #[async_trait]
    impl Collector for Panics {
        fn name(&self) -> &str {
            "panics"
        }

        async fn run(self: Box<Self>, _cancel: CancellationToken) -> Result<(), Error> {
            panic!("worker blew up");
        }
    }

    #[tokio::test]
    async fn failing_sibling_does_not_halt_the_rest() {
        let mut supervisor = Supervisor::new();
        supervisor.register(Box::new(Immediate {
            name: "ok",
            fail: false,
        }));
        supervisor.register(Box::new(Immediate {
            name: "bad",
            fail: true,
        }));

        let reports = supervisor.run(CancellationToken::new()).await;
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().any(|r| r.name == "ok" && r.outcome.is_ok()));
        assert!(reports.iter().any(|r| r.name == "bad" && r.outcome.is_err()));
    }

    #[tokio::test]
    async fn panicking_worker_is_reported_not_propagated() {
        let mut supervisor = Supervisor::new();
        supervisor.register(Box::new(Panics));
        supervisor.register(Box::new(Immediate {
            name: "ok",
            fail: false,
        }));

        let reports = supervisor.run(CancellationToken::new()).await;
        assert!(
            reports
                .iter()
                .any(|r| r.name == "panics" && r.outcome.is_err())
        );
        assert!(reports.iter().any(|r| r.name == "ok" && r.outcome.is_ok()));
    }
}
