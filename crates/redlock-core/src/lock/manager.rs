//! Quorum Lock Manager
//!
//! Provides:
//! - Lock acquisition across all endpoints with quorum counting
//! - Drift-compensated validity and jittered retry
//! - Best-effort release on every endpoint

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use redlock_common::{MAX_TTL_MS, RedlockError, Result};
use tokio::time::Instant;
use tracing::{debug, info};

use super::model::Lock;
use crate::config::LockConfig;
use crate::random::{RandomSource, ThreadRandom};
use crate::retry::{RetryExhausted, RetryPolicy};
use crate::store::{LockStore, StoreEndpoint};
use crate::token::LockToken;
use crate::validity::ValidityCalculator;

/// Why a single attempt was rejected
#[derive(Debug)]
struct AttemptFailure {
    token: LockToken,
    votes: usize,
}

/// Grants locks only when a quorum of independent stores accepted the same
/// token within one attempt.
///
/// The endpoint set is fixed at construction. The manager keeps no other
/// state, so `acquire` and `release` can be called concurrently.
pub struct LockManager {
    endpoints: Vec<StoreEndpoint>,
    quorum: usize,
    config: LockConfig,
    validity: ValidityCalculator,
    random: Arc<dyn RandomSource>,
}

impl LockManager {
    /// Create a manager over the given stores with the default configuration
    pub fn new(stores: Vec<Arc<dyn LockStore>>) -> Result<Self> {
        Self::with_config(stores, LockConfig::default())
    }

    /// Create a manager over the given stores.
    ///
    /// Fails when `stores` is empty, when two stores share an identifier, or
    /// when `config` does not validate.
    pub fn with_config(stores: Vec<Arc<dyn LockStore>>, config: LockConfig) -> Result<Self> {
        if stores.is_empty() {
            return Err(RedlockError::NoEndpoints);
        }
        config.validate()?;

        let mut seen = HashSet::new();
        let mut endpoints = Vec::with_capacity(stores.len());
        for store in stores {
            let endpoint = StoreEndpoint::new(store);
            if !seen.insert(endpoint.identifier().to_string()) {
                return Err(RedlockError::DuplicateEndpoint(
                    endpoint.identifier().to_string(),
                ));
            }
            endpoints.push(endpoint);
        }

        let quorum = quorum_for(endpoints.len());
        info!(
            endpoints = endpoints.len(),
            quorum, "Lock manager initialized"
        );

        Ok(Self {
            endpoints,
            quorum,
            validity: ValidityCalculator::from_config(&config),
            config,
            random: Arc::new(ThreadRandom),
        })
    }

    /// Replace the random source used for tokens and retry jitter
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Minimum number of endpoints that must accept a lock
    pub fn quorum(&self) -> usize {
        self.quorum
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    pub fn endpoint_ids(&self) -> impl Iterator<Item = &str> {
        self.endpoints.iter().map(StoreEndpoint::identifier)
    }

    /// Acquire `resource` for `ttl`, retrying up to the configured retry count
    pub async fn acquire(&self, resource: &str, ttl: Duration) -> Result<Lock> {
        self.acquire_with_retries(resource, ttl, self.config.retry_count)
            .await
    }

    /// Acquire `resource` for `ttl` with at most `retries` attempts.
    ///
    /// Returns `Err` only for invalid arguments: an empty resource, a ttl that
    /// is zero or longer than `MAX_TTL_MS`, or zero retries. A resource held
    /// elsewhere, or too many unreachable endpoints, yields `Ok` with an
    /// ungranted lock.
    pub async fn acquire_with_retries(
        &self,
        resource: &str,
        ttl: Duration,
        retries: u32,
    ) -> Result<Lock> {
        if resource.is_empty() {
            return Err(RedlockError::InvalidArgument(
                "resource must not be empty".to_string(),
            ));
        }
        if ttl.is_zero() {
            return Err(RedlockError::InvalidArgument(
                "ttl must be positive".to_string(),
            ));
        }
        if ttl > Duration::from_millis(MAX_TTL_MS) {
            return Err(RedlockError::InvalidArgument(format!(
                "ttl must not exceed {} ms",
                MAX_TTL_MS
            )));
        }
        if retries == 0 {
            return Err(RedlockError::InvalidArgument(
                "retries must be at least 1".to_string(),
            ));
        }

        let policy = RetryPolicy::new(retries, self.config.retry_delay());
        let outcome = policy
            .run(self.random.as_ref(), |attempt| {
                self.try_acquire(resource, ttl, attempt)
            })
            .await;

        match outcome {
            Ok(lock) => {
                info!(
                    resource = %resource,
                    validity_ms = lock.validity().as_millis() as u64,
                    "Lock granted"
                );
                Ok(lock)
            }
            Err(RetryExhausted { attempts, last }) => {
                info!(
                    resource = %resource,
                    attempts,
                    votes = last.votes,
                    quorum = self.quorum,
                    "Lock not granted, retries exhausted"
                );
                Ok(Lock::ungranted(resource, last.token))
            }
        }
    }

    /// Release `lock` on every endpoint.
    ///
    /// Deletes only where the stored value still equals the lock's token, so
    /// releasing twice, or releasing an ungranted lock, is harmless. Returns
    /// how many endpoints actually deleted the key.
    pub async fn release(&self, lock: &Lock) -> usize {
        let deleted = self
            .unlock_all(lock.resource(), lock.token(), self.config.store_timeout())
            .await;
        info!(
            resource = %lock.resource(),
            deleted,
            endpoints = self.endpoints.len(),
            "Lock released"
        );
        deleted
    }

    async fn try_acquire(
        &self,
        resource: &str,
        ttl: Duration,
        attempt: u32,
    ) -> std::result::Result<Lock, AttemptFailure> {
        let token = LockToken::generate(self.random.as_ref());
        let start = Instant::now();

        let limit = self.config.store_timeout_for(ttl);
        let votes = join_all(
            self.endpoints
                .iter()
                .map(|endpoint| endpoint.try_lock(resource, token.as_bytes(), ttl, limit)),
        )
        .await
        .into_iter()
        .filter(|accepted| *accepted)
        .count();

        let now = Instant::now();
        let validity = self.validity.remaining(ttl, now.duration_since(start));

        if votes >= self.quorum
            && let Some(validity) = validity
        {
            return Ok(Lock::granted(resource, token, validity, now));
        }

        debug!(
            resource = %resource,
            attempt,
            votes,
            quorum = self.quorum,
            validity_ms = validity.map(|v| v.as_millis() as u64),
            "Attempt rejected, cleaning up"
        );
        self.unlock_all(resource, &token, limit).await;

        Err(AttemptFailure { token, votes })
    }

    async fn unlock_all(&self, resource: &str, token: &LockToken, limit: Duration) -> usize {
        join_all(
            self.endpoints
                .iter()
                .map(|endpoint| endpoint.try_unlock(resource, token.as_bytes(), limit)),
        )
        .await
        .into_iter()
        .filter(|deleted| *deleted)
        .count()
    }
}

impl fmt::Display for LockManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LockManager (quorum {})", self.quorum)?;
        writeln!(f, "Registered endpoints:")?;
        for endpoint in &self.endpoints {
            writeln!(f, "{}", endpoint.identifier())?;
        }
        Ok(())
    }
}

/// Majority of `endpoints`: `floor(n / 2) + 1`
pub fn quorum_for(endpoints: usize) -> usize {
    endpoints / 2 + 1
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::store::MemoryStore;

    fn stores(ids: &[&str]) -> Vec<Arc<dyn LockStore>> {
        ids.iter()
            .map(|id| Arc::new(MemoryStore::new(*id)) as Arc<dyn LockStore>)
            .collect()
    }

    #[test]
    fn test_quorum_for() {
        assert_eq!(quorum_for(1), 1);
        assert_eq!(quorum_for(2), 2);
        assert_eq!(quorum_for(3), 2);
        assert_eq!(quorum_for(4), 3);
        assert_eq!(quorum_for(5), 3);
    }

    proptest! {
        #[test]
        fn prop_quorum_is_strict_majority(n in 1usize..10_000) {
            let quorum = quorum_for(n);
            prop_assert_eq!(quorum, n / 2 + 1);
            prop_assert!(2 * quorum > n);
            prop_assert!(quorum <= n);
        }
    }

    #[test]
    fn test_new_rejects_empty_endpoints() {
        let result = LockManager::new(Vec::new());
        assert!(matches!(result, Err(RedlockError::NoEndpoints)));
    }

    #[test]
    fn test_new_rejects_duplicate_identifiers() {
        let result = LockManager::new(stores(&["a", "b", "a"]));
        assert!(matches!(
            result,
            Err(RedlockError::DuplicateEndpoint(id)) if id == "a"
        ));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = LockConfig {
            retry_count: 0,
            ..Default::default()
        };
        let result = LockManager::with_config(stores(&["a"]), config);
        assert!(matches!(result, Err(RedlockError::ConfigError(_))));
    }

    #[test]
    fn test_display_lists_endpoints() {
        let manager = LockManager::new(stores(&["127.0.0.1:6379", "10.0.0.2:6379"])).unwrap();
        let text = manager.to_string();
        assert!(text.contains("Registered endpoints:"));
        assert!(text.contains("127.0.0.1:6379"));
        assert!(text.contains("10.0.0.2:6379"));
        assert_eq!(
            manager.endpoint_ids().collect::<Vec<_>>(),
            vec!["127.0.0.1:6379", "10.0.0.2:6379"]
        );
    }

    #[tokio::test]
    async fn test_acquire_rejects_invalid_arguments() {
        let manager = LockManager::new(stores(&["a"])).unwrap();

        let err = manager.acquire("", Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, RedlockError::InvalidArgument(_)));

        let err = manager.acquire("res", Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, RedlockError::InvalidArgument(_)));

        let err = manager
            .acquire_with_retries("res", Duration::from_secs(1), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, RedlockError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_acquire_rejects_oversized_ttl() {
        let manager = LockManager::new(stores(&["a", "b", "c"])).unwrap();

        let err = manager.acquire("res", Duration::MAX).await.unwrap_err();
        assert!(matches!(err, RedlockError::InvalidArgument(_)));

        let err = manager
            .acquire("res", Duration::from_secs(u64::MAX / 2))
            .await
            .unwrap_err();
        assert!(matches!(err, RedlockError::InvalidArgument(_)));

        let err = manager
            .acquire("res", Duration::from_millis(MAX_TTL_MS + 1))
            .await
            .unwrap_err();
        assert!(matches!(err, RedlockError::InvalidArgument(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_accepts_longest_ttl() {
        let manager = LockManager::new(stores(&["a", "b", "c"])).unwrap();
        let ttl = Duration::from_millis(MAX_TTL_MS);

        let lock = manager.acquire("res", ttl).await.unwrap();
        assert!(lock.is_granted());
        assert!(lock.validity() < ttl);
        assert_eq!(manager.release(&lock).await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_endpoint_acts_as_plain_lock() {
        let manager = LockManager::new(stores(&["only"])).unwrap();
        assert_eq!(manager.quorum(), 1);

        let lock = manager.acquire("res", Duration::from_secs(10)).await.unwrap();
        assert!(lock.is_granted());

        let second = manager
            .acquire_with_retries("res", Duration::from_secs(10), 1)
            .await
            .unwrap();
        assert!(!second.is_granted());

        assert_eq!(manager.release(&lock).await, 1);
        let third = manager.acquire("res", Duration::from_secs(10)).await.unwrap();
        assert!(third.is_granted());
    }
}
