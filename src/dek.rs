//! Per-record data keys.
//!
//! Every envelope gets its own random 256-bit data key. The raw key lives
//! only for the duration of a single seal/open/rotate call; storage only
//! ever sees the wrapped form produced by the key provider.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::EnvelopeError;
use crate::types::AES_KEY_LENGTH;

/// A raw 256-bit data key. Zeroized on drop, not cloneable.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DataKey([u8; AES_KEY_LENGTH]);

impl DataKey {
    /// Generate a fresh random data key.
    pub fn generate() -> Result<Self, EnvelopeError> {
        let mut key = [0u8; AES_KEY_LENGTH];
        getrandom::getrandom(&mut key)
            .map_err(|e| EnvelopeError::RandomnessUnavailable(e.to_string()))?;
        Ok(Self(key))
    }

    /// Take ownership of raw key bytes.
    pub fn from_bytes(bytes: [u8; AES_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; AES_KEY_LENGTH] {
        &self.0
    }
}

impl std::fmt::Debug for DataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DataKey(..)")
    }
}
