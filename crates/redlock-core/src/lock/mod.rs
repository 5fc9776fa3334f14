//! Quorum lock
//!
//! This module provides:
//! - The `Lock` handed back to callers
//! - `LockManager`, which acquires and releases locks across all endpoints

mod manager;
mod model;

pub use manager::*;
pub use model::*;
