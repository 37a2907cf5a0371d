//! Fixed-delay loop shared by the crawler workers.
//!
//! Each worker runs one cycle, waits its scan delay, and repeats until the
//! shutdown token is cancelled. A failed cycle is logged and the loop
//! carries on; nothing is retried within a cycle.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::Result;

/// One periodic unit of crawler work.
#[async_trait]
pub trait Worker: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run one cycle. Long cycles should check `shutdown` between items.
    async fn run_cycle(&self, shutdown: &CancellationToken) -> Result<()>;
}

/// Drives a [`Worker`] on a fixed delay.
pub struct WorkerRunner {
    worker: Arc<dyn Worker>,
    delay: Duration,
    shutdown: CancellationToken,
}

impl WorkerRunner {
    pub fn new(worker: Arc<dyn Worker>, delay: Duration, shutdown: CancellationToken) -> Self {
        Self {
            worker,
            delay,
            shutdown,
        }
    }

    /// Run until the shutdown token is cancelled.
    pub async fn run(self) {
        let name = self.worker.name();
        info!(
            worker = name,
            delay_secs = self.delay.as_secs(),
            "worker starting"
        );

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            if let Err(e) = self.worker.run_cycle(&self.shutdown).await {
                error!(worker = name, error = %e, "cycle failed");
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.delay) => {}
            }
        }

        info!(worker = name, "worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CrawlerError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        cycles: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Worker for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn run_cycle(&self, _shutdown: &CancellationToken) -> Result<()> {
            self.cycles.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CrawlerError::Timeout { operation: "test" });
            }
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_cycles_until_cancelled() {
        let worker = Arc::new(Counting {
            cycles: AtomicUsize::new(0),
            fail: true,
        });
        let shutdown = CancellationToken::new();
        let runner = WorkerRunner::new(worker.clone(), Duration::from_secs(30), shutdown.clone());
        let handle = tokio::spawn(runner.run());

        tokio::time::sleep(Duration::from_secs(95)).await;
        shutdown.cancel();
        handle.await.unwrap();

        // Cycles at t=0, 30, 60, 90; failures do not stop the loop
        assert_eq!(worker.cycles.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_runs_nothing() {
        let worker = Arc::new(Counting {
            cycles: AtomicUsize::new(0),
            fail: false,
        });
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        WorkerRunner::new(worker.clone(), Duration::from_secs(1), shutdown)
            .run()
            .await;
        assert_eq!(worker.cycles.load(Ordering::SeqCst), 0);
    }
}
