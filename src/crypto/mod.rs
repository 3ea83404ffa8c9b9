//! Key derivation and authenticated encryption.
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA256 password-based key derivation
//! - ChaCha20-Poly1305 authenticated tokens with embedded versioning
//! - URL-safe text transport for tokens and salts

mod engine;
mod errors;

pub use engine::{
    generate_salt, CipherEngine, DEFAULT_KDF_ITERATIONS, MAX_KDF_ITERATIONS, SALT_LEN,
};
pub use errors::{CryptoError, CryptoResult};
