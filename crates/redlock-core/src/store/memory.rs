// In-memory lock store
// Set-if-absent and compare-and-delete with per-key expiry over DashMap

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use redlock_common::StoreError;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use super::LockStore;

/// A stored value and its expiry
struct StoreEntry {
    value: Vec<u8>,
    /// `None` when `now + ttl` is past the clock's range
    expires_at: Option<Instant>,
}

impl StoreEntry {
    fn new(value: Vec<u8>, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// In-process store. Expired keys are treated as absent and replaced lazily;
/// `spawn_expiry_sweep` removes the ones nobody touches again.
///
/// Can be switched offline to simulate an unreachable endpoint.
pub struct MemoryStore {
    identifier: String,
    entries: DashMap<String, StoreEntry>,
    online: AtomicBool,
}

impl MemoryStore {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            entries: DashMap::new(),
            online: AtomicBool::new(true),
        }
    }

    /// Toggle availability; an offline store fails every call
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Current unexpired value of `key`
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    /// Write `value` unconditionally, replacing whatever is stored
    pub fn put(&self, key: impl Into<String>, value: impl Into<Vec<u8>>, ttl: Duration) {
        self.entries.insert(key.into(), StoreEntry::new(value.into(), ttl));
    }

    /// Number of stored entries, expired ones included until purged
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(store = %self.identifier, count = removed, "Purged expired entries");
        }
        removed
    }

    /// Start a background task purging expired entries every `period`.
    ///
    /// The task holds a weak reference and ends once the store is dropped.
    /// Must be called from within a tokio runtime.
    pub fn spawn_expiry_sweep(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store: Weak<Self> = Arc::downgrade(self);
        info!(
            store = %self.identifier,
            period_ms = period.as_millis() as u64,
            "Starting expiry sweep"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                match store.upgrade() {
                    Some(store) => {
                        store.purge_expired();
                    }
                    None => break,
                }
            }
        })
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.is_online() {
            Ok(())
        } else {
            Err(StoreError::Unavailable(format!(
                "{} is offline",
                self.identifier
            )))
        }
    }
}

#[async_trait]
impl LockStore for MemoryStore {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &[u8],
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        self.ensure_online()?;

        let entry = StoreEntry::new(value.to_vec(), ttl);

        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if !occupied.get().is_expired() {
                    return Ok(false);
                }
                occupied.insert(entry);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
            }
        }
        Ok(true)
    }

    async fn compare_and_delete(&self, key: &str, expected: &[u8]) -> Result<bool, StoreError> {
        self.ensure_online()?;

        let removed = self
            .entries
            .remove_if(key, |_, entry| !entry.is_expired() && entry.value == expected);
        Ok(removed.is_some())
    }
}
