//! Fixed-interval retry for scheduler calls
//!
//! A failed call is repeated up to `count` extra times, sleeping the same
//! `delay` between attempts. There is no backoff and no jitter: callers rely
//! on the worst-case latency being exactly `count * delay` plus call time.

use std::fmt::Display;
use std::time::Duration;

use tracing::debug;

use crate::client::Operation;

/// Default number of extra attempts after the first
pub const DEFAULT_RETRY_COUNT: u32 = 5;

/// Default delay between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(15);

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first (0 = try once)
    pub count: u32,
    /// Fixed sleep between a failed attempt and the next one
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            count: DEFAULT_RETRY_COUNT,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(count: u32, delay: Duration) -> Self {
        Self { count, delay }
    }

    /// A policy that tries exactly once
    pub fn no_retry() -> Self {
        Self {
            count: 0,
            delay: Duration::ZERO,
        }
    }

    /// Total number of attempts
    pub fn max_attempts(&self) -> u32 {
        self.count.saturating_add(1)
    }

    /// Upper bound on time spent sleeping when every attempt fails
    pub fn worst_case_delay(&self) -> Duration {
        self.delay.saturating_mul(self.count)
    }
}

/// Wraps a single call with bounded, fixed-interval retry.
///
/// Holds no state beyond its policy, so one instance can be shared by any
/// number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Retrier {
    policy: RetryPolicy,
}

impl Retrier {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `call` until it succeeds or the attempts are used up.
    ///
    /// Returns the first success, or the error of the final attempt exactly
    /// as the call produced it.
    pub fn fetch<T, E, F>(&self, operation: Operation, mut call: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        let attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            match call() {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(
                            event = "lava.retry.recovered",
                            operation = %operation,
                            attempt,
                        );
                    }
                    return Ok(value);
                }
                Err(e) if attempt < attempts => {
                    debug!(
                        event = "lava.retry.attempt_failed",
                        operation = %operation,
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                    );
                    if !self.policy.delay.is_zero() {
                        std::thread::sleep(self.policy.delay);
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
