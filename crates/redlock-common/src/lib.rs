//! Redlock Common - Shared types for the quorum lock crates
//!
//! This crate provides:
//! - Error types for caller mistakes and store failures
//! - Defaults shared by the core library and the CLI

pub mod error;

// Re-exports for convenience
pub use error::{RedlockError, Result, StoreError};

/// Default number of acquisition attempts per `acquire` call
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Default upper bound of the jittered delay between attempts
pub const DEFAULT_RETRY_DELAY_MS: u64 = 200;

/// Fraction of the ttl subtracted to compensate for clock drift
pub const CLOCK_DRIFT_FACTOR: f64 = 0.01;

/// Fixed drift compensation: 1 ms store expiry precision plus 1 ms minimum drift
pub const MIN_DRIFT_MS: u64 = 2;

/// Default upper bound of a single store call
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 50;

/// Longest lease `acquire` accepts: 365 days
pub const MAX_TTL_MS: u64 = 365 * 24 * 60 * 60 * 1000;
