//! Envelope schema v1 and its JSON codec.
//!
//! The envelope is the single opaque value persistence stores per record:
//!
//! ```json
//! {"version":1,"algorithm":"AES-256-GCM","nonce":"...","authTag":"...",
//!  "ciphertext":"...","wrappedDataKey":"...","context":{"entryId":"42"}}
//! ```
//!
//! Binary fields are base64 (standard, padded). Decoding validates the
//! version before interpreting any other field; an unrecognized version is
//! rejected outright rather than best-effort parsed.

use serde::{Deserialize, Serialize};

use crate::base64::{serde_b64, serde_b64_opt};
use crate::error::EnvelopeError;
use crate::types::{
    EncryptionContext, AES_GCM_NONCE_LENGTH, AES_GCM_TAG_LENGTH, ALGORITHM_AES_256_GCM,
    ENVELOPE_VERSION,
};

/// A sealed record body plus everything needed to open it again.
///
/// Immutable once sealed, except that rotation replaces `wrapped_data_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    /// Schema version, currently always 1.
    pub version: u8,

    /// Cipher identifier, currently always `AES-256-GCM`.
    pub algorithm: String,

    /// Per-seal random nonce (12 bytes).
    #[serde(with = "serde_b64")]
    pub nonce: Vec<u8>,

    /// Detached GCM authentication tag (16 bytes).
    #[serde(rename = "authTag", with = "serde_b64")]
    pub auth_tag: Vec<u8>,

    /// Encrypted record content.
    #[serde(with = "serde_b64")]
    pub ciphertext: Vec<u8>,

    /// The record's data key, wrapped under a master key by the provider.
    #[serde(rename = "wrappedDataKey", with = "serde_b64")]
    pub wrapped_data_key: Vec<u8>,

    /// Context bound into the AAD, echoed here so `open` can recompute it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<EncryptionContext>,

    /// Caller-supplied raw AAD, also bound on seal.
    #[serde(
        rename = "additionalAad",
        with = "serde_b64_opt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_aad: Option<Vec<u8>>,
}

impl Envelope {
    /// Check version, algorithm and field shapes without touching any key
    /// material. Called by `decode` and again by the service before use.
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        if self.version != ENVELOPE_VERSION {
            return Err(EnvelopeError::UnsupportedVersion(self.version));
        }
        if self.algorithm != ALGORITHM_AES_256_GCM {
            return Err(EnvelopeError::UnsupportedAlgorithm(self.algorithm.clone()));
        }
        if self.nonce.len() != AES_GCM_NONCE_LENGTH {
            return Err(EnvelopeError::InvalidNonceLength {
                expected: AES_GCM_NONCE_LENGTH,
                got: self.nonce.len(),
            });
        }
        if self.auth_tag.len() != AES_GCM_TAG_LENGTH {
            return Err(EnvelopeError::InvalidTagLength {
                expected: AES_GCM_TAG_LENGTH,
                got: self.auth_tag.len(),
            });
        }
        if self.wrapped_data_key.is_empty() {
            return Err(EnvelopeError::Malformed("empty wrappedDataKey".into()));
        }
        Ok(())
    }
}

/// Serialize an envelope to its canonical JSON storage form.
pub fn encode(envelope: &Envelope) -> Result<String, EnvelopeError> {
    serde_json::to_string(envelope).map_err(|e| EnvelopeError::Malformed(e.to_string()))
}

// Minimal first-pass parse: only the version field is interpreted.
#[derive(Deserialize)]
struct VersionProbe {
    version: u8,
}

/// Parse an envelope from its JSON storage form.
///
/// The version is gated first; only then are the remaining fields parsed
/// and validated. Unknown or missing fields fail closed.
pub fn decode(serialized: &str) -> Result<Envelope, EnvelopeError> {
    let probe: VersionProbe = serde_json::from_str(serialized)
        .map_err(|e| EnvelopeError::Malformed(e.to_string()))?;
    if probe.version != ENVELOPE_VERSION {
        return Err(EnvelopeError::UnsupportedVersion(probe.version));
    }

    let envelope: Envelope = serde_json::from_str(serialized)
        .map_err(|e| EnvelopeError::Malformed(e.to_string()))?;
    envelope.validate()?;
    Ok(envelope)
}
