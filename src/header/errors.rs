//! Header error types

use thiserror::Error;

/// Errors from header mutation.
///
/// Parse failures are not errors at all: the codec degrades them to an
/// empty header with the whole input as body.
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("document has no header; construct one before setting fields")]
    Empty,
}

/// Result type alias for header operations
pub type HeaderResult<T> = Result<T, HeaderError>;
