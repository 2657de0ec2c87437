//! Master key rotation: re-wrap data keys without touching ciphertext.
//!
//! Rotation unwraps an envelope's data key under the old master and
//! re-wraps it under the current one. Ciphertext, nonce, tag and context
//! are byte-identical in the output, so bulk content is never re-encrypted
//! when masters rotate. Swapping the rotated envelope into storage
//! atomically is the caller's transaction concern.

use std::sync::Arc;

use tracing::warn;

use crate::envelope::Envelope;
use crate::error::EnvelopeError;
use crate::provider::KeyProvider;

pub struct RotationCoordinator {
    provider: Arc<dyn KeyProvider>,
}

impl RotationCoordinator {
    pub fn new(provider: Arc<dyn KeyProvider>) -> Self {
        Self { provider }
    }

    /// Re-wrap one envelope's data key under the active master key.
    ///
    /// Only `wrapped_data_key` changes; opening the result yields the same
    /// plaintext as opening the input.
    pub fn rotate(&self, envelope: &Envelope) -> Result<Envelope, EnvelopeError> {
        envelope.validate()?;
        let data_key = self.provider.unwrap(&envelope.wrapped_data_key)?;
        let rewrapped = self.provider.wrap(&data_key)?;
        drop(data_key);

        let mut rotated = envelope.clone();
        rotated.wrapped_data_key = rewrapped.bytes;
        Ok(rotated)
    }

    /// Rotate a batch of envelopes, reporting each outcome individually.
    ///
    /// One record's failure (say, its master key was already destroyed)
    /// never aborts the rest of the batch.
    pub fn rotate_batch(
        &self,
        envelopes: &[(String, Envelope)],
    ) -> Vec<(String, Result<Envelope, EnvelopeError>)> {
        envelopes
            .iter()
            .map(|(id, envelope)| {
                let result = self.rotate(envelope);
                if let Err(err) = &result {
                    warn!(record = %id, %err, "rotation failed for record");
                }
                (id.clone(), result)
            })
            .collect()
    }
}
