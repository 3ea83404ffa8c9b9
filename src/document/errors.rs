//! Document lifecycle error types

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::header::HeaderError;

/// Errors surfaced by document lifecycle operations.
///
/// Cryptographic and header failures that the protocol can recover from
/// (wrong password, malformed token, missing header line) are handled
/// inside the lifecycle with prompts and fallbacks; what escapes here
/// aborts only the operation in progress, never the session.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("no document is open")]
    NoDocument,

    #[error("document is locked; unlock it before saving")]
    Locked,

    #[error("document is already encrypted")]
    AlreadyEncrypted,

    #[error("document is not encrypted")]
    NotEncrypted,

    #[error("no session password is available")]
    NoPassword,

    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for lifecycle operations
pub type DocumentResult<T> = Result<T, DocumentError>;
