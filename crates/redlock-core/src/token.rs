//! Lock token generation

use std::fmt;

use crate::random::RandomSource;

/// Token length in bytes (160 bits of entropy)
pub const TOKEN_LEN: usize = 20;

/// Opaque value identifying one acquisition attempt.
///
/// Written to every store as the lock value and required again to delete it,
/// so a holder can only ever remove its own key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LockToken([u8; TOKEN_LEN]);

impl LockToken {
    /// Draw a fresh token from the given source
    pub fn generate(random: &dyn RandomSource) -> Self {
        let mut bytes = [0u8; TOKEN_LEN];
        random.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&const_hex::encode(self.0))
    }
}

impl fmt::Debug for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LockToken({})", self)
    }
}
