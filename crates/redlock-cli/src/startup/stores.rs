// Store endpoint wiring
// Builds one in-process store per configured identifier

use std::sync::Arc;
use std::time::Duration;

use redlock_core::{LockStore, MemoryStore};
use tracing::{info, warn};

/// How often each store drops expired keys
pub const EXPIRY_SWEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Build a `MemoryStore` per endpoint identifier, each with its expiry sweep
/// running. Must be called from within a tokio runtime.
///
/// Identifiers listed in `offline` start unreachable so that quorum loss can
/// be observed from the command line.
pub fn memory_stores(endpoints: &[String], offline: &[String]) -> Vec<Arc<dyn LockStore>> {
    for id in offline {
        if !endpoints.contains(id) {
            warn!(endpoint = %id, "Offline endpoint is not configured, ignoring");
        }
    }

    endpoints
        .iter()
        .map(|id| {
            let store = Arc::new(MemoryStore::new(id.as_str()));
            if offline.contains(id) {
                store.set_online(false);
            }
            store.spawn_expiry_sweep(EXPIRY_SWEEP_INTERVAL);
            info!(endpoint = %id, online = store.is_online(), "Registered store endpoint");
            store as Arc<dyn LockStore>
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_endpoints_reject_calls() {
        let endpoints = vec!["a".to_string(), "b".to_string()];
        let offline = vec!["b".to_string(), "missing".to_string()];

        let stores = memory_stores(&endpoints, &offline);
        assert_eq!(stores.len(), 2);
        assert_eq!(stores[0].identifier(), "a");

        let ttl = Duration::from_secs(1);
        assert!(stores[0].set_if_absent("res", b"t", ttl).await.unwrap());
        assert!(stores[1].set_if_absent("res", b"t", ttl).await.is_err());
    }
}
