//! AES-256-GCM cipher engine with detached authentication tag.
//!
//! Encrypt/decrypt take the key, nonce and AAD explicitly; the envelope
//! layer decides where those bytes come from. Tag verification happens
//! before any plaintext is released — on a tag mismatch the working
//! buffer is zeroized and only `Integrity` comes back.

use aes_gcm::aead::KeyInit;
use aes_gcm::{AeadInPlace, Aes256Gcm, Nonce, Tag};
use zeroize::Zeroize;

use crate::error::EnvelopeError;
use crate::types::{AES_GCM_NONCE_LENGTH, AES_GCM_TAG_LENGTH, AES_KEY_LENGTH};

/// Generate a random 12-byte nonce for AES-GCM.
pub fn generate_nonce() -> Result<[u8; AES_GCM_NONCE_LENGTH], EnvelopeError> {
    let mut nonce = [0u8; AES_GCM_NONCE_LENGTH];
    getrandom::getrandom(&mut nonce)
        .map_err(|e| EnvelopeError::RandomnessUnavailable(e.to_string()))?;
    Ok(nonce)
}

fn build_cipher(key: &[u8]) -> Result<Aes256Gcm, EnvelopeError> {
    if key.len() != AES_KEY_LENGTH {
        return Err(EnvelopeError::InvalidKeyLength {
            expected: AES_KEY_LENGTH,
            got: key.len(),
        });
    }
    // Length validated above, new_from_slice cannot fail
    Aes256Gcm::new_from_slice(key).map_err(|_| EnvelopeError::InvalidKeyLength {
        expected: AES_KEY_LENGTH,
        got: key.len(),
    })
}

fn check_nonce(nonce: &[u8]) -> Result<(), EnvelopeError> {
    if nonce.len() != AES_GCM_NONCE_LENGTH {
        return Err(EnvelopeError::InvalidNonceLength {
            expected: AES_GCM_NONCE_LENGTH,
            got: nonce.len(),
        });
    }
    Ok(())
}

/// Encrypt plaintext, returning ciphertext and a detached 16-byte tag.
///
/// Inputs are not mutated; no key material is retained past the call.
pub fn encrypt(
    key: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<(Vec<u8>, [u8; AES_GCM_TAG_LENGTH]), EnvelopeError> {
    check_nonce(nonce)?;
    let cipher = build_cipher(key)?;

    let mut buffer = plaintext.to_vec();
    let tag = match cipher.encrypt_in_place_detached(Nonce::from_slice(nonce), aad, &mut buffer) {
        Ok(tag) => tag,
        // Only reachable for plaintext beyond the GCM length limit
        Err(_) => {
            buffer.zeroize();
            return Err(EnvelopeError::Malformed("plaintext too large".into()));
        }
    };

    let mut tag_bytes = [0u8; AES_GCM_TAG_LENGTH];
    tag_bytes.copy_from_slice(&tag);
    Ok((buffer, tag_bytes))
}

/// Decrypt ciphertext, verifying the detached tag over ciphertext and AAD.
///
/// Fails with `Integrity` and no plaintext on any tag mismatch (tamper,
/// wrong key, wrong AAD).
pub fn decrypt(
    key: &[u8],
    nonce: &[u8],
    ciphertext: &[u8],
    aad: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, EnvelopeError> {
    check_nonce(nonce)?;
    if tag.len() != AES_GCM_TAG_LENGTH {
        return Err(EnvelopeError::InvalidTagLength {
            expected: AES_GCM_TAG_LENGTH,
            got: tag.len(),
        });
    }
    let cipher = build_cipher(key)?;

    let mut buffer = ciphertext.to_vec();
    match cipher.decrypt_in_place_detached(
        Nonce::from_slice(nonce),
        aad,
        &mut buffer,
        Tag::from_slice(tag),
    ) {
        Ok(()) => Ok(buffer),
        Err(_) => {
            buffer.zeroize();
            Err(EnvelopeError::Integrity)
        }
    }
}
