// Lock manager configuration
// Retry, drift compensation and store timeout settings

use std::time::Duration;

use redlock_common::{
    CLOCK_DRIFT_FACTOR, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY_MS, DEFAULT_STORE_TIMEOUT_MS,
    MIN_DRIFT_MS, RedlockError, Result,
};
use serde::{Deserialize, Serialize};

/// Configuration for a `LockManager`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockConfig {
    /// Acquisition attempts per `acquire` call (default: 3)
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Upper bound of the random delay between attempts in milliseconds (default: 200ms)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Fraction of the ttl reserved for clock drift (default: 0.01)
    #[serde(default = "default_clock_drift_factor")]
    pub clock_drift_factor: f64,

    /// Fixed drift compensation in milliseconds (default: 2ms)
    #[serde(default = "default_min_drift_ms")]
    pub min_drift_ms: u64,

    /// Upper bound of a single store call in milliseconds (default: 50ms)
    /// The effective bound is also capped at a tenth of the requested ttl
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

fn default_retry_count() -> u32 {
    DEFAULT_RETRY_COUNT
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

fn default_clock_drift_factor() -> f64 {
    CLOCK_DRIFT_FACTOR
}

fn default_min_drift_ms() -> u64 {
    MIN_DRIFT_MS
}

fn default_store_timeout_ms() -> u64 {
    DEFAULT_STORE_TIMEOUT_MS
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            retry_count: DEFAULT_RETRY_COUNT,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            clock_drift_factor: CLOCK_DRIFT_FACTOR,
            min_drift_ms: MIN_DRIFT_MS,
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
        }
    }
}

impl LockConfig {
    /// Get the retry delay as Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Get the fixed drift compensation as Duration
    pub fn min_drift(&self) -> Duration {
        Duration::from_millis(self.min_drift_ms)
    }

    /// Get the configured store timeout as Duration
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Bound for one store call made on behalf of a lock with the given ttl.
    ///
    /// Never longer than a tenth of the ttl so that a partitioned store cannot
    /// consume the lease, and never shorter than 1ms.
    pub fn store_timeout_for(&self, ttl: Duration) -> Duration {
        self.store_timeout()
            .min(ttl / 10)
            .max(Duration::from_millis(1))
    }

    pub fn validate(&self) -> Result<()> {
        if self.retry_count == 0 {
            return Err(RedlockError::ConfigError(
                "retry_count must be at least 1".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.clock_drift_factor) {
            return Err(RedlockError::ConfigError(format!(
                "clock_drift_factor must be in [0, 1), got {}",
                self.clock_drift_factor
            )));
        }
        if self.store_timeout_ms == 0 {
            return Err(RedlockError::ConfigError(
                "store_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LockConfig::default();
        assert_eq!(config.retry_count, 3);
        assert_eq!(config.retry_delay(), Duration::from_millis(200));
        assert_eq!(config.min_drift(), Duration::from_millis(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: LockConfig =
            serde_json::from_str(r#"{"retry_count": 5, "store_timeout_ms": 20}"#).unwrap();
        assert_eq!(config.retry_count, 5);
        assert_eq!(config.store_timeout_ms, 20);
        assert_eq!(config.retry_delay_ms, 200);
        assert_eq!(config.clock_drift_factor, 0.01);
    }

    #[test]
    fn test_store_timeout_capped_by_ttl() {
        let config = LockConfig::default();
        assert_eq!(
            config.store_timeout_for(Duration::from_secs(10)),
            Duration::from_millis(50)
        );
        assert_eq!(
            config.store_timeout_for(Duration::from_millis(200)),
            Duration::from_millis(20)
        );
        assert_eq!(
            config.store_timeout_for(Duration::from_millis(3)),
            Duration::from_millis(1)
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = LockConfig {
            retry_count: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(RedlockError::ConfigError(_))));

        let config = LockConfig {
            clock_drift_factor: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = LockConfig {
            store_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
