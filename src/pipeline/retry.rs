//! Capped exponential backoff.
//!
//! Used only around the two operations most prone to transient failure:
//! package index refresh/install (network, mirror flakiness) and the
//! post-deployment health probe (service still warming up). Everything else
//! in the pipeline is a plain synchronous call.

use std::time::Duration;

use tracing::warn;

use crate::error::Result;

/// Retry policy: fixed attempt cap with doubling, capped delays.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    /// Total attempts, including the first.
    pub attempts: u32,

    /// Delay before the second attempt.
    pub base: Duration,

    /// Upper bound on any single delay.
    pub cap: Duration,
}

impl Backoff {
    pub fn new(attempts: u32, base: Duration, cap: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base,
            cap,
        }
    }

    /// Policy for package manager operations.
    pub fn for_installer() -> Self {
        Self::new(3, Duration::from_secs(2), Duration::from_secs(10))
    }

    /// Policy for the health probe.
    pub fn for_probe() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(5))
    }

    /// Delay before attempt `n` (1-based; attempt 1 has no delay).
    fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let doublings = attempt.saturating_sub(2).min(16);
        let delay = self.base.saturating_mul(2u32.saturating_pow(doublings));
        delay.min(self.cap)
    }
}

/// Run `op` until it succeeds or the attempt cap is reached.
///
/// Returns the last error when all attempts fail.
pub fn with_backoff<T>(policy: &Backoff, mut op: impl FnMut() -> Result<T>) -> Result<T> {
    let mut attempt = 1;
    loop {
        let delay = policy.delay_before(attempt);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.attempts => {
                warn!(
                    attempt,
                    max_attempts = policy.attempts,
                    "transient failure, retrying: {}",
                    err
                );
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
