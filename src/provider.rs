//! Key provider: wraps and unwraps per-record data keys under master keys.
//!
//! The provider is a capability the envelope service is constructed with.
//! Production deployments back it with an external master-key service; the
//! in-process `LocalKeyProvider` here covers tests and single-node use.

use std::collections::HashMap;

use parking_lot::RwLock;
use zeroize::Zeroizing;

use crate::dek::DataKey;
use crate::error::EnvelopeError;
use crate::types::AES_KEY_LENGTH;

/// A wrapped data key plus the id of the master key that wrapped it.
#[derive(Debug, Clone)]
pub struct WrappedKey {
    pub bytes: Vec<u8>,
    pub key_id: String,
}

/// Wrap/unwrap capability for per-record data keys.
///
/// Implementations must be safe for concurrent use; seal/open/rotate for
/// different records run in parallel against the same provider.
pub trait KeyProvider: Send + Sync {
    /// Wrap a raw data key under the active master key.
    fn wrap(&self, data_key: &DataKey) -> Result<WrappedKey, EnvelopeError>;

    /// Recover a raw data key from its wrapped form.
    ///
    /// Fails with `KeyUnavailable` when the wrapping master key is retired
    /// or unknown.
    fn unwrap(&self, wrapped: &[u8]) -> Result<DataKey, EnvelopeError>;
}

/// AES-KW output size for a 32-byte key: 32 + 8 bytes.
const AES_KW_OUTPUT_SIZE: usize = 40;

/// Wrapped blob size: 4-byte master-key id prefix + AES-KW output.
pub const WRAPPED_KEY_SIZE: usize = 4 + AES_KW_OUTPUT_SIZE;

struct Masters {
    active: u32,
    keys: HashMap<u32, Zeroizing<[u8; AES_KEY_LENGTH]>>,
}

/// In-process key provider using AES-KW (RFC 3394).
///
/// Wrapped blob format: `[master key id:4 BE][AES-KW(master, dek):40]`.
/// The id prefix lets `unwrap` locate the right master key without any
/// out-of-band state, so envelopes wrapped under older masters stay
/// readable until those masters are retired.
pub struct LocalKeyProvider {
    masters: RwLock<Masters>,
}

impl LocalKeyProvider {
    /// Create a provider with a fresh random master key (id 1).
    pub fn new() -> Result<Self, EnvelopeError> {
        let mut master = Zeroizing::new([0u8; AES_KEY_LENGTH]);
        getrandom::getrandom(&mut *master)
            .map_err(|e| EnvelopeError::RandomnessUnavailable(e.to_string()))?;
        Ok(Self::with_master(*master))
    }

    /// Create a provider with a caller-supplied master key (id 1).
    pub fn with_master(master: [u8; AES_KEY_LENGTH]) -> Self {
        let mut keys = HashMap::new();
        keys.insert(1, Zeroizing::new(master));
        Self {
            masters: RwLock::new(Masters { active: 1, keys }),
        }
    }

    /// Id of the master key new wraps use.
    pub fn active_key_id(&self) -> u32 {
        self.masters.read().active
    }

    /// Install a fresh random master key and make it active.
    ///
    /// Previous masters stay available for unwrapping (grace period) until
    /// explicitly retired. Returns the new active id.
    pub fn rotate_master(&self) -> Result<u32, EnvelopeError> {
        let mut master = Zeroizing::new([0u8; AES_KEY_LENGTH]);
        getrandom::getrandom(&mut *master)
            .map_err(|e| EnvelopeError::RandomnessUnavailable(e.to_string()))?;

        let mut masters = self.masters.write();
        let next = masters.active + 1;
        masters.keys.insert(next, master);
        masters.active = next;
        Ok(next)
    }

    /// Drop a master key. Envelopes still wrapped under it become
    /// unreadable until rotated, so retire only after rotation completes.
    pub fn retire(&self, key_id: u32) {
        self.masters.write().keys.remove(&key_id);
    }
}

impl KeyProvider for LocalKeyProvider {
    fn wrap(&self, data_key: &DataKey) -> Result<WrappedKey, EnvelopeError> {
        let masters = self.masters.read();
        let key_id = masters.active;
        // The active key is always present in the table
        let master = masters
            .keys
            .get(&key_id)
            .ok_or_else(|| EnvelopeError::KeyUnavailable(format!("master key {key_id}")))?;

        let kek = aes_kw::Kek::from(**master);
        let mut wrapped = [0u8; AES_KW_OUTPUT_SIZE];
        kek.wrap(data_key.as_bytes(), &mut wrapped)
            .map_err(|e| EnvelopeError::KeyUnavailable(format!("wrap failed: {e:?}")))?;

        let mut bytes = Vec::with_capacity(WRAPPED_KEY_SIZE);
        bytes.extend_from_slice(&key_id.to_be_bytes());
        bytes.extend_from_slice(&wrapped);
        Ok(WrappedKey {
            bytes,
            key_id: key_id.to_string(),
        })
    }

    fn unwrap(&self, wrapped: &[u8]) -> Result<DataKey, EnvelopeError> {
        if wrapped.len() != WRAPPED_KEY_SIZE {
            return Err(EnvelopeError::Malformed(format!(
                "wrapped key must be {WRAPPED_KEY_SIZE} bytes, got {}",
                wrapped.len()
            )));
        }
        let key_id = u32::from_be_bytes(
            wrapped[..4]
                .try_into()
                .expect("slice is exactly 4 bytes after length check"),
        );

        let masters = self.masters.read();
        let master = masters.keys.get(&key_id).ok_or_else(|| {
            EnvelopeError::KeyUnavailable(format!("master key {key_id} retired or unknown"))
        })?;

        let kek = aes_kw::Kek::from(**master);
        let mut raw = Zeroizing::new([0u8; AES_KEY_LENGTH]);
        kek.unwrap(&wrapped[4..], &mut *raw).map_err(|_| {
            EnvelopeError::KeyUnavailable(format!(
                "wrapped key does not unwrap under master key {key_id}"
            ))
        })?;
        Ok(DataKey::from_bytes(*raw))
    }
}
