use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::{error::FdcError, poll};

/// Bounded retry with a fixed pause between attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(10, Duration::from_secs(20))
    }
}

/// Run `operation` until it succeeds or `policy.max_attempts` attempts fail.
///
/// The operation receives the 1-based attempt number. Failed attempts are
/// logged with the number of remaining attempts and followed by a
/// `policy.interval` pause, except for the last one. Terminal errors
/// (see [`FdcError::is_terminal`]) are returned without retrying.
pub async fn retry<T, F, Fut, S, SFut>(
    policy: &RetryPolicy,
    label: &str,
    sleep: S,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, FdcError>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, FdcError>>,
    S: Fn(Duration) -> SFut + Copy,
    SFut: Future<Output = ()>,
{
    for attempt in 1..=policy.max_attempts {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_terminal() => return Err(err),
            Err(err) => {
                let remaining = policy.max_attempts - attempt;
                warn!(
                    attempt,
                    remaining,
                    error = %err,
                    "{} failed", label
                );
                if remaining > 0 {
                    poll::sleep_or_cancel(sleep, policy.interval, cancel).await?;
                }
            }
        }
    }
    Err(FdcError::RetriesExhausted(policy.max_attempts))
}
