//! Canonical AAD construction.
//!
//! The AAD binds the envelope's context map and optional raw AAD into the
//! authenticated encryption. Layout (all lengths u32 big-endian):
//!
//! ```text
//! "journal:envelope:v1\0"
//! [pair count]
//! per pair, ascending by key: [len(k)][k][len(v)][v]
//! [0x01][len(aad)][aad]   when additional AAD is present
//! [0x00]                  when absent
//! ```
//!
//! Length prefixes make the encoding unambiguous (no separator injection),
//! and sorted pairs make it independent of map construction order. The
//! same bytes must be produced on seal and open or decryption fails.

use crate::types::EncryptionContext;

const AAD_PREFIX: &[u8] = b"journal:envelope:v1\0";

/// Build the combined AAD from a context map and optional raw AAD.
///
/// An empty context and an absent context produce identical output.
pub fn build_aad(context: &EncryptionContext, additional: Option<&[u8]>) -> Vec<u8> {
    let mut aad = Vec::with_capacity(AAD_PREFIX.len() + 16);
    aad.extend_from_slice(AAD_PREFIX);
    aad.extend_from_slice(&(context.len() as u32).to_be_bytes());
    for (key, value) in context {
        aad.extend_from_slice(&(key.len() as u32).to_be_bytes());
        aad.extend_from_slice(key.as_bytes());
        aad.extend_from_slice(&(value.len() as u32).to_be_bytes());
        aad.extend_from_slice(value.as_bytes());
    }
    match additional {
        Some(extra) => {
            aad.push(0x01);
            aad.extend_from_slice(&(extra.len() as u32).to_be_bytes());
            aad.extend_from_slice(extra);
        }
        None => aad.push(0x00),
    }
    aad
}
