//! Shared constants and type aliases for the envelope format.

use std::collections::BTreeMap;

/// AES-256 key length in bytes.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-GCM nonce length in bytes (96 bits).
pub const AES_GCM_NONCE_LENGTH: usize = 12;

/// AES-GCM authentication tag length in bytes (128 bits).
pub const AES_GCM_TAG_LENGTH: usize = 16;

/// Envelope schema version written by new seals.
pub const ENVELOPE_VERSION: u8 = 1;

/// Algorithm identifier for v1 envelopes.
pub const ALGORITHM_AES_256_GCM: &str = "AES-256-GCM";

/// String-to-string binding folded into the AAD of every seal.
///
/// A BTreeMap so iteration order is sorted by key — the canonical order
/// the AAD construction relies on.
pub type EncryptionContext = BTreeMap<String, String>;
