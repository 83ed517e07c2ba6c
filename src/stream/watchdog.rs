//! Inactivity watchdog.
//!
//! One timer per session. The session resets it whenever a chunk arrives
//! and races [`Watchdog::expired`] against the next read.

use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Instant, Sleep};

/// Default inactivity window, also used as the request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Deadline used when `now + timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

#[derive(Debug)]
pub struct Watchdog {
    timeout: Duration,
    sleep: Pin<Box<Sleep>>,
}

impl Watchdog {
    /// Arm the timer now.
    pub fn start(timeout: Duration) -> Self {
        Self {
            timeout,
            sleep: Box::pin(tokio::time::sleep(timeout)),
        }
    }

    /// Push the deadline a full window past now.
    pub fn reset(&mut self) {
        let now = Instant::now();
        let deadline = now
            .checked_add(self.timeout)
            .unwrap_or_else(|| now + FAR_FUTURE);
        self.sleep.as_mut().reset(deadline);
    }

    /// Resolves when the window passes without a reset. Cancel-safe.
    pub async fn expired(&mut self) {
        self.sleep.as_mut().await;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn deadline(&self) -> Instant {
        self.sleep.deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_timeout() {
        let mut watchdog = Watchdog::start(Duration::from_secs(180));
        let started = Instant::now();
        watchdog.expired().await;
        assert!(started.elapsed() >= Duration::from_secs(180));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_pushes_deadline() {
        let mut watchdog = Watchdog::start(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(8)).await;
        watchdog.reset();

        let fired = tokio::time::timeout(Duration::from_secs(5), watchdog.expired()).await;
        assert!(fired.is_err(), "watchdog fired before the reset window passed");

        let fired = tokio::time::timeout(Duration::from_secs(6), watchdog.expired()).await;
        assert!(fired.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_with_huge_timeout_does_not_overflow() {
        let mut watchdog = Watchdog::start(Duration::from_secs(u64::MAX));
        watchdog.reset();
        assert!(watchdog.deadline() > Instant::now() + Duration::from_secs(86400 * 365));

        let fired = tokio::time::timeout(Duration::from_secs(3600), watchdog.expired()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_is_cancel_safe() {
        let mut watchdog = Watchdog::start(Duration::from_secs(10));
        for _ in 0..3 {
            tokio::select! {
                _ = watchdog.expired() => panic!("fired too early"),
                _ = tokio::time::sleep(Duration::from_secs(2)) => {}
            }
        }
        let fired = tokio::time::timeout(Duration::from_secs(5), watchdog.expired()).await;
        assert!(fired.is_ok());
    }
}
