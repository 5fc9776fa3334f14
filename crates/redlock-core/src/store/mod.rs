//! Store capability
//!
//! A `LockStore` is one independent key-value backend. The manager only needs
//! two atomic primitives from it:
//! - set-if-absent with expiry
//! - delete-if-value-matches, evaluated atomically on the store side
//!
//! Any backend offering both satisfies the lock algorithm.

mod memory;

pub use memory::*;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redlock_common::StoreError;
use tokio::time::timeout;

/// One independent key-value backend
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Stable identity used for diagnostics
    fn identifier(&self) -> &str;

    /// Set `key` to `value` with expiry `ttl` only if `key` does not exist.
    /// Returns whether the set happened.
    async fn set_if_absent(&self, key: &str, value: &[u8], ttl: Duration)
    -> Result<bool, StoreError>;

    /// Delete `key` only if its current value equals `expected`.
    /// Returns whether a key was deleted.
    async fn compare_and_delete(&self, key: &str, expected: &[u8]) -> Result<bool, StoreError>;
}

/// A registered store together with its identifier.
///
/// Every call made through an endpoint is bounded by a timeout and every
/// failure is turned into a `false` vote; nothing escapes to the caller.
#[derive(Clone)]
pub struct StoreEndpoint {
    identifier: String,
    store: Arc<dyn LockStore>,
}

impl StoreEndpoint {
    pub fn new(store: Arc<dyn LockStore>) -> Self {
        Self {
            identifier: store.identifier().to_string(),
            store,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Vote on locking `key` with `value`
    pub async fn try_lock(&self, key: &str, value: &[u8], ttl: Duration, limit: Duration) -> bool {
        let result = match timeout(limit, self.store.set_if_absent(key, value, ttl)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(limit)),
        };

        match result {
            Ok(accepted) => {
                tracing::debug!(endpoint = %self.identifier, key = %key, accepted, "Lock vote");
                accepted
            }
            Err(e) => {
                tracing::warn!(endpoint = %self.identifier, key = %key, error = %e, "Lock vote failed");
                false
            }
        }
    }

    /// Best-effort delete of `key` if it still holds `value`
    pub async fn try_unlock(&self, key: &str, value: &[u8], limit: Duration) -> bool {
        let result = match timeout(limit, self.store.compare_and_delete(key, value)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(limit)),
        };

        match result {
            Ok(deleted) => {
                tracing::debug!(endpoint = %self.identifier, key = %key, deleted, "Unlock");
                deleted
            }
            Err(e) => {
                tracing::warn!(endpoint = %self.identifier, key = %key, error = %e, "Unlock failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for StoreEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreEndpoint")
            .field("identifier", &self.identifier)
            .finish()
    }
}
