//! Bounded polling waits

use crate::page::AutomationError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::debug;

/// Default timeout for element waits (15 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 15_000;

/// Default poll interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Wait configuration for the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Timeout applied when a step does not pass its own (milliseconds)
    pub timeout_ms: u64,

    /// Delay between condition checks (milliseconds)
    pub poll_interval_ms: u64,
}

impl WaitConfig {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout_ms: timeout.as_millis() as u64,
            poll_interval_ms: poll_interval.as_millis() as u64,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Poll interval, never zero so a wait cannot spin
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// Why a bounded wait ended without a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitFailure {
    /// Deadline passed
    TimedOut,

    /// Probe returned a non-transient error
    Failed(AutomationError),
}

/// Poll `probe` until it yields a value, bounded by `limit`.
///
/// `Ok(None)` and transient errors (not found, stale) keep polling. The whole
/// loop runs under `tokio::time::timeout`, so a probe that hangs cannot
/// extend the wait past `limit`.
pub async fn wait_until<T, F, Fut>(
    limit: Duration,
    poll_interval: Duration,
    mut probe: F,
) -> Result<T, WaitFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, AutomationError>>,
{
    let polling = async {
        loop {
            match probe().await {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(err) if err.is_transient_while_waiting() => {
                    debug!(error = %err, "transient failure while waiting; polling again");
                }
                Err(err) => return Err(WaitFailure::Failed(err)),
            }
            sleep(poll_interval).await;
        }
    };

    match timeout(limit, polling).await {
        Ok(result) => result,
        Err(_) => Err(WaitFailure::TimedOut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    #[test]
    fn test_default_wait_config() {
        let config = WaitConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
        assert_eq!(
            WaitConfig {
                timeout_ms: 10,
                poll_interval_ms: 0
            }
            .poll_interval(),
            Duration::from_millis(1)
        );
    }

    #[tokio::test]
    async fn test_always_false_respects_timeout() {
        let start = Instant::now();
        let result: Result<(), _> = wait_until(
            Duration::from_millis(200),
            Duration::from_millis(20),
            || async { Ok(None) },
        )
        .await;
        let elapsed = start.elapsed();

        assert_eq!(result, Err(WaitFailure::TimedOut));
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_hanging_probe_is_bounded() {
        let start = Instant::now();
        let result: Result<(), _> = wait_until(
            Duration::from_millis(100),
            Duration::from_millis(10),
            || async {
                sleep(Duration::from_secs(5)).await;
                Ok(Some(()))
            },
        )
        .await;

        assert_eq!(result, Err(WaitFailure::TimedOut));
        assert!(start.elapsed() < Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_transient_errors_keep_polling() {
        let calls = AtomicUsize::new(0);
        let result = wait_until(Duration::from_secs(2), Duration::from_millis(5), || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                match attempt {
                    0 => Err(AutomationError::not_found("#late")),
                    1 => Err(AutomationError::stale("re-rendered")),
                    2 => Ok(None),
                    _ => Ok(Some(attempt)),
                }
            }
        })
        .await;

        assert_eq!(result, Ok(3));
    }

    #[tokio::test]
    async fn test_hard_errors_stop_the_wait() {
        let result: Result<(), _> = wait_until(
            Duration::from_secs(2),
            Duration::from_millis(5),
            || async { Err(AutomationError::transport("connection closed")) },
        )
        .await;

        assert_eq!(
            result,
            Err(WaitFailure::Failed(AutomationError::transport(
                "connection closed"
            )))
        );
    }
}
