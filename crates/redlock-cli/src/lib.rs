//! Redlock CLI - console entry for the quorum lock
//!
//! Wires the configured endpoints into a `LockManager`, acquires one
//! resource, optionally holds it, and releases it.

pub mod model;
pub mod startup;
