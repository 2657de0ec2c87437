use thiserror::Error;

/// Failures surfaced by the envelope core.
///
/// Variants fall into four classes:
/// - format: `UnsupportedVersion`, `UnsupportedAlgorithm`, `Malformed`,
///   `InvalidKeyLength`, `InvalidNonceLength`, `InvalidTagLength`
/// - key availability: `KeyUnavailable`
/// - integrity: `Integrity`, `ContextMismatch`
/// - randomness: `RandomnessUnavailable`
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Unsupported envelope version: {0}")]
    UnsupportedVersion(u8),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Malformed envelope: {0}")]
    Malformed(String),

    #[error("Invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("Invalid nonce length: expected {expected} bytes, got {got}")]
    InvalidNonceLength { expected: usize, got: usize },

    #[error("Invalid auth tag length: expected {expected} bytes, got {got}")]
    InvalidTagLength { expected: usize, got: usize },

    #[error("Master key unavailable: {0}")]
    KeyUnavailable(String),

    // Deliberately carries no detail: the failure itself is the only
    // information safe to surface.
    #[error("Envelope failed authentication")]
    Integrity,

    #[error("Envelope is bound to a different context than the caller expected")]
    ContextMismatch,

    #[error("Secure randomness unavailable: {0}")]
    RandomnessUnavailable(String),
}

impl EnvelopeError {
    /// Whether a caller may reasonably retry the failed operation.
    ///
    /// Only key resolution can be transient (provider unreachable).
    /// Format and integrity failures are permanent for a given envelope.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EnvelopeError::KeyUnavailable(_))
    }
}
