use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);
const MAX_JITTER_RATIO: f64 = 0.1;

/// Classifies whether a failure may succeed when the same operation is attempted again.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Delay before the attempt following `attempt` (1-based): `base * 2^(attempt-1)`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(20);
    base.saturating_mul(1_u32 << exponent)
}

fn with_jitter(delay: Duration) -> Duration {
    let ratio = rand::thread_rng().gen_range(0.0..MAX_JITTER_RATIO);
    delay.saturating_add(delay.mul_f64(ratio))
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or the policy's
/// attempts are used up. Attempts are strictly sequential.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1_u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retryable() || attempt >= max_attempts {
                    return Err(err);
                }

                let delay = with_jitter(backoff_delay(policy.base_delay, attempt));
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "retrying after failure: {err}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
