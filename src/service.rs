//! Envelope service: the seal/open API the rest of the application uses.
//!
//! Each seal generates a fresh data key and nonce, encrypts the record
//! body, wraps the data key via the key provider and assembles a v1
//! envelope. Open is the inverse. Raw data keys exist only inside a
//! single call and are zeroized when it returns, on every path.

use std::sync::Arc;

use tracing::warn;

use crate::aad::build_aad;
use crate::aes_gcm;
use crate::dek::DataKey;
use crate::envelope::Envelope;
use crate::error::EnvelopeError;
use crate::provider::KeyProvider;
use crate::types::{EncryptionContext, ALGORITHM_AES_256_GCM, ENVELOPE_VERSION};

/// Which schema version and algorithm new seals produce.
///
/// Passed in at construction so tests can run several configurations side
/// by side; there is no process-global current-algorithm state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoConfig {
    pub version: u8,
    pub algorithm: String,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            version: ENVELOPE_VERSION,
            algorithm: ALGORITHM_AES_256_GCM.to_string(),
        }
    }
}

/// Seals and opens record bodies using a key provider capability.
pub struct EnvelopeService {
    provider: Arc<dyn KeyProvider>,
    config: CryptoConfig,
}

impl EnvelopeService {
    pub fn new(provider: Arc<dyn KeyProvider>) -> Self {
        Self::with_config(provider, CryptoConfig::default())
    }

    pub fn with_config(provider: Arc<dyn KeyProvider>, config: CryptoConfig) -> Self {
        Self { provider, config }
    }

    /// Encrypt a record body into a v1 envelope.
    ///
    /// `context` is bound into the AAD (canonicalized, so construction
    /// order never matters) and echoed into the envelope; `additional_aad`
    /// is bound verbatim. Returns a fully populated envelope or an error,
    /// never a partial one.
    pub fn seal(
        &self,
        plaintext: &[u8],
        context: &EncryptionContext,
        additional_aad: Option<&[u8]>,
    ) -> Result<Envelope, EnvelopeError> {
        if self.config.version != ENVELOPE_VERSION {
            return Err(EnvelopeError::UnsupportedVersion(self.config.version));
        }
        if self.config.algorithm != ALGORITHM_AES_256_GCM {
            return Err(EnvelopeError::UnsupportedAlgorithm(
                self.config.algorithm.clone(),
            ));
        }

        let data_key = DataKey::generate()?;
        let nonce = aes_gcm::generate_nonce()?;
        let aad = build_aad(context, additional_aad);

        let (ciphertext, auth_tag) =
            aes_gcm::encrypt(data_key.as_bytes(), &nonce, plaintext, &aad)?;
        let wrapped = self.provider.wrap(&data_key)?;
        drop(data_key); // zeroized here; only the wrapped form survives

        Ok(Envelope {
            version: self.config.version,
            algorithm: self.config.algorithm.clone(),
            nonce: nonce.to_vec(),
            auth_tag: auth_tag.to_vec(),
            ciphertext,
            wrapped_data_key: wrapped.bytes,
            context: if context.is_empty() {
                None
            } else {
                Some(context.clone())
            },
            additional_aad: additional_aad.map(|a| a.to_vec()),
        })
    }

    /// Decrypt a v1 envelope back to the record body.
    ///
    /// When `expected_context` is given it must equal the envelope's
    /// stored context before any key is unwrapped — this catches a caller
    /// applying one record's binding to a different envelope without
    /// spending a provider round trip on it.
    pub fn open(
        &self,
        envelope: &Envelope,
        expected_context: Option<&EncryptionContext>,
    ) -> Result<Vec<u8>, EnvelopeError> {
        envelope.validate()?;

        let stored_context = envelope.context.clone().unwrap_or_default();
        if let Some(expected) = expected_context {
            if *expected != stored_context {
                return Err(EnvelopeError::ContextMismatch);
            }
        }

        let data_key = self.provider.unwrap(&envelope.wrapped_data_key)?;
        let aad = build_aad(&stored_context, envelope.additional_aad.as_deref());

        let plaintext = aes_gcm::decrypt(
            data_key.as_bytes(),
            &envelope.nonce,
            &envelope.ciphertext,
            &aad,
            &envelope.auth_tag,
        )
        .map_err(|e| {
            if matches!(e, EnvelopeError::Integrity) {
                warn!("envelope failed authentication (tamper or wrong key/context)");
            }
            e
        })?;
        drop(data_key);

        Ok(plaintext)
    }
}
