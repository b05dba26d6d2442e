//! Retry policy: bounded polling with a delay between attempts.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Retry policy for read-back confirmation.
///
/// The host applies writes eventually, so confirmations poll a bounded number
/// of times. The default is a fixed delay (multiplier 1.0).
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of evaluations (at least one is always made).
    pub attempts: u32,

    /// Delay before the second evaluation.
    pub base_delay: Duration,

    /// Backoff multiplier applied per attempt.
    pub multiplier: f64,
}

impl RetryPolicy {
    /// Fixed delay between attempts.
    pub fn fixed(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts,
            base_delay: delay,
            multiplier: 1.0,
        }
    }

    /// Calculate delay after the given attempt.
    ///
    /// # Arguments
    /// * `attempts` - Number of attempts already made (1-indexed).
    ///
    /// delay = base_delay * multiplier^(attempts - 1)
    pub fn next_delay(&self, attempts: u32) -> Duration {
        let base_secs = self.base_delay.as_secs_f64();
        let delay_secs = base_secs * self.multiplier.powi(attempts.saturating_sub(1) as i32);
        Duration::from_secs_f64(delay_secs)
    }
}

impl Default for RetryPolicy {
    /// 4 attempts, 250ms apart.
    fn default() -> Self {
        Self::fixed(4, Duration::from_millis(250))
    }
}

/// Evaluate `predicate` until it returns true or the policy runs out.
///
/// Sleeps between evaluations, never after the last one.
pub async fn wait_for_predicate<F, Fut>(policy: &RetryPolicy, mut predicate: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let attempts = policy.attempts.max(1);
    for attempt in 1..=attempts {
        if predicate().await {
            debug!(attempt, "predicate satisfied");
            return true;
        }
        if attempt < attempts {
            tokio::time::sleep(policy.next_delay(attempt)).await;
        }
    }
    debug!(attempts, "predicate not satisfied, out of retries");
    false
}
