//! Bounded polling for resolution-dependent operations.

use sightline_common::error::AutomationError;
use std::time::Duration;
use tokio::time::{Instant, sleep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl WaitPolicy {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(200);

    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: Self::DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

/// Re-invokes `attempt` until it succeeds or the timeout elapses. Only
/// `NotFound` is swallowed and retried; any other failure aborts the poll
/// immediately. On timeout, the last `NotFound` reason (or the supplied
/// default) becomes the `Timeout` message. At least one attempt always
/// runs.
pub async fn poll<T, F>(
    policy: WaitPolicy,
    mut attempt: F,
    default_reason: impl FnOnce() -> String,
) -> Result<T, AutomationError>
where
    F: AsyncFnMut() -> Result<T, AutomationError>,
{
    let deadline = Instant::now() + policy.timeout;
    let mut last_reason = None;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err @ AutomationError::NotFound(_)) => {
                last_reason = Some(err.to_string());
            }
            Err(other) => return Err(other),
        }
        if Instant::now() >= deadline {
            return Err(AutomationError::Timeout(
                last_reason.unwrap_or_else(default_reason),
            ));
        }
        sleep(policy.interval).await;
    }
}
