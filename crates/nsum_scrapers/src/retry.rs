use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, warn};

/// A uniformly random duration in `[low, high]`.
pub fn random_between(low: Duration, high: Duration) -> Duration {
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    let low_ms = low.as_millis() as u64;
    let high_ms = high.as_millis() as u64;
    if low_ms == high_ms {
        return low;
    }
    Duration::from_millis(rand::rng().random_range(low_ms..=high_ms))
}

/// Bounded retry with a randomized pause between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            min_delay,
            max_delay,
        }
    }

    /// No pause between attempts.
    pub fn immediate(max_attempts: usize) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    pub fn backoff(&self) -> Duration {
        random_between(self.min_delay, self.max_delay)
    }

    /// Runs `op` until it succeeds or the attempts run out, returning the
    /// last error. `op` receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= max_attempts => {
                    error!(
                        operation,
                        attempt,
                        max = max_attempts,
                        elapsed_ms_total = t0.elapsed().as_millis() as u64,
                        error = %e,
                        "exhausted retries"
                    );
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.backoff();
                    warn!(
                        operation,
                        attempt,
                        max = max_attempts,
                        ?delay,
                        error = %e,
                        "attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
