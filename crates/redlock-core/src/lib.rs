//! Redlock Core - quorum lock acquisition over independent stores
//!
//! This crate provides:
//! - The `LockStore` capability and an in-memory implementation
//! - Lock tokens drawn from an injectable random source
//! - Drift-compensated validity and jittered retry
//! - `LockManager`, which grants a lock only when a quorum of stores agree

pub mod config;
pub mod lock;
pub mod random;
pub mod retry;
pub mod store;
pub mod token;
pub mod validity;

// Re-export commonly used types
pub use config::LockConfig;
pub use lock::{Lock, LockManager};
pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use retry::{RetryExhausted, RetryPolicy};
pub use store::{LockStore, MemoryStore, StoreEndpoint};
pub use token::LockToken;
pub use validity::ValidityCalculator;

pub use redlock_common::{RedlockError, Result, StoreError};
