//! Cooperative shutdown timer
//!
//! A single-shot background task that signals a duration-bounded driver run
//! to stop once the configured interval elapses. The timer never interrupts
//! the run; it only sets the shared stop flag, which the driver is expected
//! to poll. A driver that ignores the flag runs past the bound.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::debug;

use crate::driver::StopFlag;
use crate::{BenchError, Result, SHUTDOWN_WAIT_LIMIT};

/// One-shot timer that sets a [`StopFlag`] after a delay.
///
/// Runs on its own tokio task, independent of the thread executing the
/// driver. The flag is guaranteed to be set no earlier than `delay` after
/// arming. The task always runs to completion; [`ShutdownTimer::wait`] must
/// be called once the driver's run has returned, so the timer is confirmed
/// finished before the next iteration starts.
#[derive(Debug)]
pub struct ShutdownTimer {
    handle: JoinHandle<()>,
}

impl ShutdownTimer {
    /// Arms the timer: after `delay`, the stop flag is set.
    pub fn arm(delay: Duration, stop: StopFlag) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(delay = %humantime::format_duration(delay), "shutting down driver");
            stop.set();
        });

        Self { handle }
    }

    /// Waits for the timer task to finish, bounded by
    /// [`SHUTDOWN_WAIT_LIMIT`]. Exceeding the limit, or a timer task that
    /// did not run to completion, aborts the benchmark.
    pub async fn wait(self) -> Result<()> {
        match timeout(SHUTDOWN_WAIT_LIMIT, self.handle).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(BenchError::Timer(format!(
                "shutdown timer task did not complete: {}",
                e
            ))),
            Err(_) => Err(BenchError::Timer(format!(
                "shutdown timer still running after {}",
                humantime::format_duration(SHUTDOWN_WAIT_LIMIT)
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_timer_sets_flag_after_delay() {
        let stop = StopFlag::new();
        let timer = ShutdownTimer::arm(Duration::from_millis(50), stop.clone());

        assert!(!stop.is_set());
        timer.wait().await.unwrap();
        assert!(stop.is_set());
    }

    #[tokio::test]
    async fn test_timer_fires_no_earlier_than_delay() {
        let stop = StopFlag::new();
        let started = Instant::now();
        let timer = ShutdownTimer::arm(Duration::from_millis(100), stop.clone());

        timer.wait().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(100));
        assert!(stop.is_set());
    }

    #[tokio::test]
    async fn test_wait_after_fire_returns_immediately() {
        let stop = StopFlag::new();
        let timer = ShutdownTimer::arm(Duration::from_millis(10), stop.clone());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(stop.is_set());

        let waited = Instant::now();
        timer.wait().await.unwrap();
        assert!(waited.elapsed() < Duration::from_secs(1));
    }
}
