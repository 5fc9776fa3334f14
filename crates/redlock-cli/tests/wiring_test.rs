// Integration tests for CLI wiring
// Configuration -> stores -> LockManager

use std::time::Duration;

use redlock_cli::model::{Cli, Configuration};
use redlock_cli::startup::memory_stores;
use redlock_core::LockManager;

fn configuration(endpoints: &[&str], offline: &[&str]) -> Configuration {
    let args = Cli {
        config_file: Some("/nonexistent/redlock".to_string()),
        resource: Some("orders".to_string()),
        ttl_ms: Some(10_000),
        endpoints: endpoints.iter().map(|s| s.to_string()).collect(),
        offline: offline.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    };
    Configuration::from_cli(args).unwrap()
}

fn manager_for(configuration: &Configuration) -> LockManager {
    let stores = memory_stores(
        &configuration.endpoints(),
        &configuration.offline_endpoints(),
    );
    LockManager::with_config(stores, configuration.lock_config().unwrap()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_default_two_endpoints_need_both() {
    let configuration = configuration(&[], &[]);
    let manager = manager_for(&configuration);
    assert_eq!(manager.quorum(), 2);

    let lock = manager
        .acquire(&configuration.resource(), configuration.ttl())
        .await
        .unwrap();
    assert!(lock.is_granted());
    assert_eq!(manager.release(&lock).await, 2);
}

#[tokio::test(start_paused = true)]
async fn test_offline_majority_blocks_acquire() {
    let configuration = configuration(&["a", "b", "c"], &["b", "c"]);
    let manager = manager_for(&configuration);

    let lock = manager
        .acquire(&configuration.resource(), Duration::from_secs(10))
        .await
        .unwrap();
    assert!(!lock.is_granted());
}

#[tokio::test(start_paused = true)]
async fn test_offline_minority_is_tolerated() {
    let configuration = configuration(&["a", "b", "c"], &["c"]);
    let manager = manager_for(&configuration);

    let lock = manager
        .acquire(&configuration.resource(), configuration.ttl())
        .await
        .unwrap();
    assert!(lock.is_granted());
    assert_eq!(lock.resource(), "orders");
}
