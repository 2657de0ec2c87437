//! Envelope encryption for journal record bodies.
//!
//! Diary entries and AI comment bodies are never stored in plaintext:
//! each record is encrypted under its own random 256-bit data key with
//! AES-256-GCM, and the data key is wrapped under a longer-lived master
//! key held by a [`provider::KeyProvider`]. The persisted unit is a v1
//! [`envelope::Envelope`] (JSON, base64 fields) carrying the nonce, tag,
//! ciphertext, wrapped key and the AAD-bound context.
//!
//! Master key rotation re-wraps data keys via [`rotate::RotationCoordinator`]
//! without re-encrypting any content.

pub mod aad;
pub mod aes_gcm;
pub mod base64;
pub mod dek;
pub mod envelope;
pub mod error;
pub mod provider;
pub mod rotate;
pub mod service;
pub mod types;

pub use aad::build_aad;
pub use base64::{b64_decode, b64_encode};
pub use dek::DataKey;
pub use envelope::{decode, encode, Envelope};
pub use error::EnvelopeError;
pub use provider::{KeyProvider, LocalKeyProvider, WrappedKey, WRAPPED_KEY_SIZE};
pub use rotate::RotationCoordinator;
pub use service::{CryptoConfig, EnvelopeService};
pub use types::{
    EncryptionContext, AES_GCM_NONCE_LENGTH, AES_GCM_TAG_LENGTH, AES_KEY_LENGTH,
    ALGORITHM_AES_256_GCM, ENVELOPE_VERSION,
};
