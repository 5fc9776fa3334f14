//! Drift-compensated lease validity

use std::time::Duration;

use crate::config::LockConfig;

/// Computes how much of a lease is still safe to use after an attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidityCalculator {
    clock_drift_factor: f64,
    min_drift: Duration,
}

impl Default for ValidityCalculator {
    fn default() -> Self {
        Self::from_config(&LockConfig::default())
    }
}

impl ValidityCalculator {
    pub fn new(clock_drift_factor: f64, min_drift: Duration) -> Self {
        Self {
            clock_drift_factor,
            min_drift,
        }
    }

    pub fn from_config(config: &LockConfig) -> Self {
        Self::new(config.clock_drift_factor, config.min_drift())
    }

    /// Drift compensation for a ttl, at the millisecond precision of store expiry
    pub fn drift(&self, ttl: Duration) -> Duration {
        let proportional = (ttl.as_millis() as f64 * self.clock_drift_factor).round() as u64;
        Duration::from_millis(proportional) + self.min_drift
    }

    /// Validity left once `elapsed` and the drift are taken out of `ttl`.
    ///
    /// `None` means the result is zero or negative; such a lease must not be
    /// reported as granted even when a quorum accepted it.
    pub fn remaining(&self, ttl: Duration, elapsed: Duration) -> Option<Duration> {
        ttl.checked_sub(elapsed)
            .and_then(|left| left.checked_sub(self.drift(ttl)))
            .filter(|validity| !validity.is_zero())
    }
}
