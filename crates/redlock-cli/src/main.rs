//! Main entry point for the redlock CLI.
//!
//! Acquires the configured resource across all endpoints and releases it
//! again if it was granted.

use redlock_cli::{model::Configuration, startup};
use redlock_core::LockManager;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize configuration and logging
    let configuration = Configuration::new()?;
    let _logging_guard = startup::init_logging(&configuration.logging_config())?;

    let endpoints = configuration.endpoints();
    let offline = configuration.offline_endpoints();
    let stores = startup::memory_stores(&endpoints, &offline);
    let manager = LockManager::with_config(stores, configuration.lock_config()?)?;
    info!("{}", manager);

    let resource = configuration.resource();
    let ttl = configuration.ttl();
    let lock = manager.acquire(&resource, ttl).await?;

    if !lock.is_granted() {
        warn!(resource = %resource, quorum = manager.quorum(), "Could not acquire lock");
        anyhow::bail!("lock on '{}' was not granted", resource);
    }

    info!(
        resource = %resource,
        token = %lock.token(),
        validity_ms = lock.validity().as_millis() as u64,
        "Lock acquired"
    );

    let hold = configuration.hold().min(lock.remaining());
    if !hold.is_zero() {
        info!(hold_ms = hold.as_millis() as u64, "Holding lock");
        tokio::time::sleep(hold).await;
    }

    let deleted = manager.release(&lock).await;
    info!(resource = %resource, deleted, "Done");

    Ok(())
}
