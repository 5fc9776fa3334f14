//! Lock data model

use std::time::Duration;

use tokio::time::Instant;

use crate::token::LockToken;

/// Result of one `acquire` call.
///
/// `granted` tells whether a quorum accepted `token` with a positive validity.
/// An ungranted lock carries the token of its last attempt and can still be
/// passed to `release`, which is then a no-op.
#[derive(Debug, Clone)]
pub struct Lock {
    resource: String,
    token: LockToken,
    validity: Duration,
    granted: bool,
    expires_at: Option<Instant>,
}

impl Lock {
    pub(crate) fn granted(
        resource: impl Into<String>,
        token: LockToken,
        validity: Duration,
        now: Instant,
    ) -> Self {
        Self {
            resource: resource.into(),
            token,
            validity,
            granted: true,
            expires_at: Some(now + validity),
        }
    }

    pub(crate) fn ungranted(resource: impl Into<String>, token: LockToken) -> Self {
        Self {
            resource: resource.into(),
            token,
            validity: Duration::ZERO,
            granted: false,
            expires_at: None,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn token(&self) -> &LockToken {
        &self.token
    }

    /// Safe lease time computed when the lock was granted
    pub fn validity(&self) -> Duration {
        self.validity
    }

    pub fn is_granted(&self) -> bool {
        self.granted
    }

    /// Validity left from now; zero once the lease is over or if never granted
    pub fn remaining(&self) -> Duration {
        self.expires_at
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO)
    }

    /// Whether the lock was granted and its validity has not run out
    pub fn is_valid(&self) -> bool {
        !self.remaining().is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;

    #[tokio::test(start_paused = true)]
    async fn test_granted_lock_remaining() {
        let token = LockToken::generate(&SeededRandom::new(3));
        let lock = Lock::granted("res", token, Duration::from_millis(500), Instant::now());

        assert!(lock.is_granted());
        assert!(lock.is_valid());
        assert_eq!(lock.remaining(), Duration::from_millis(500));

        tokio::time::advance(Duration::from_millis(200)).await;
        assert_eq!(lock.remaining(), Duration::from_millis(300));

        tokio::time::advance(Duration::from_millis(300)).await;
        assert!(!lock.is_valid());
    }

    #[test]
    fn test_ungranted_lock() {
        let token = LockToken::generate(&SeededRandom::new(3));
        let lock = Lock::ungranted("res", token.clone());

        assert!(!lock.is_granted());
        assert!(!lock.is_valid());
        assert_eq!(lock.resource(), "res");
        assert_eq!(lock.token(), &token);
        assert_eq!(lock.validity(), Duration::ZERO);
    }
}
