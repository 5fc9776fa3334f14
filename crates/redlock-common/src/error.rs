//! Error types for redlock
//!
//! This module defines:
//! - `RedlockError`: invalid arguments and configuration handed to the manager
//! - `StoreError`: failures reported by a single store endpoint

use std::time::Duration;

/// Errors caused by the caller. A busy resource is never one of these.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RedlockError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("lock manager requires at least one store endpoint")]
    NoEndpoints,

    #[error("store endpoint '{0}' registered more than once")]
    DuplicateEndpoint(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Failure of one store call. Converted into a failed vote by the manager.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed store response: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, RedlockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redlock_error_display() {
        let err = RedlockError::InvalidArgument("ttl must be positive".to_string());
        assert_eq!(format!("{}", err), "invalid argument: ttl must be positive");

        let err = RedlockError::DuplicateEndpoint("127.0.0.1:6379".to_string());
        assert_eq!(
            format!("{}", err),
            "store endpoint '127.0.0.1:6379' registered more than once"
        );
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Timeout(Duration::from_millis(50));
        assert_eq!(format!("{}", err), "store call timed out after 50ms");

        let err = StoreError::Unavailable("connection refused".to_string());
        assert_eq!(format!("{}", err), "store unavailable: connection refused");
    }
}
