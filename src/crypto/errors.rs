//! Crypto error types

use thiserror::Error;

/// Errors from key derivation and the cipher engine.
///
/// Callers treat [`CryptoError::MalformedToken`] and
/// [`CryptoError::UnsupportedVersion`] exactly like
/// [`CryptoError::Authentication`]: the document cannot be unlocked with
/// the material at hand, and the stored file is never touched.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("authentication failed: wrong password or corrupted data")]
    Authentication,

    #[error("malformed ciphertext token: {0}")]
    MalformedToken(&'static str),

    #[error("unsupported token version: {0}")]
    UnsupportedVersion(u8),

    #[error("stored iteration count {0} is outside the accepted range")]
    SuspectIterations(u32),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
}

/// Result type alias for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;
