//! Bounded retry with jittered backoff

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::random::RandomSource;

/// Returned when every attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    /// Number of attempts made
    pub attempts: u32,
    /// Failure reported by the last attempt
    pub last: E,
}

/// Calls an attempt function up to `max_attempts` times, sleeping a random
/// duration in `[0, base_delay)` between attempts to desynchronize competing
/// clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least 1
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Run `attempt` until it succeeds or the attempts are used up.
    ///
    /// `attempt` receives the 1-based attempt number. No sleep happens after a
    /// success or after the last failed attempt.
    pub async fn run<T, E, F, Fut>(
        &self,
        random: &dyn RandomSource,
        mut attempt: F,
    ) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut current = 1;
        loop {
            match attempt(current).await {
                Ok(value) => return Ok(value),
                Err(last) if current >= self.max_attempts => {
                    return Err(RetryExhausted {
                        attempts: current,
                        last,
                    });
                }
                Err(_) => {
                    sleep(self.jitter(random)).await;
                    current += 1;
                }
            }
        }
    }

    fn jitter(&self, random: &dyn RandomSource) -> Duration {
        let upper = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(random.next_below(upper))
    }
}
