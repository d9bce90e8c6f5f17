#![forbid(unsafe_code)]

use async_trait::async_trait;
use std::time::{Duration, SystemTime};

/// Wall-clock seam for the monitor loop. Rotation buckets, line timestamps
/// and the debug-report cadence all derive from `now()`, so tests can drive
/// them without real time passing.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;

    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
