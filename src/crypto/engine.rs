//! Password-based key derivation and the authenticated token format.
//!
//! Keys come from PBKDF2-HMAC-SHA256 over the session password and the
//! document's stored salt. A token is `version byte || 12-byte nonce ||
//! ChaCha20-Poly1305 ciphertext+tag`; version and nonce are bound as
//! associated data, so the tag covers them too. Tokens travel inside
//! document bodies as URL-safe base64 text.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::errors::{CryptoError, CryptoResult};

/// Default KDF work factor for newly encrypted documents.
///
/// Persisted settings may override this for *new* documents; decryption
/// always uses the count stored in the document's own header, so raising
/// it never invalidates older files.
pub const DEFAULT_KDF_ITERATIONS: u32 = 768_000;

/// Ceiling on iteration counts accepted from stored headers; a crafted
/// header must not be able to pin the CPU for minutes.
pub const MAX_KDF_ITERATIONS: u32 = 10_000_000;

/// Salt length in bytes, before text encoding.
pub const SALT_LEN: usize = 32;

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;
const TAG_LEN: usize = 16;
const TOKEN_VERSION: u8 = 1;

/// Generate a fresh document salt as URL-safe text.
///
/// The returned string is stored verbatim in the header and fed back to
/// the KDF as UTF-8 bytes.
pub fn generate_salt() -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    URL_SAFE_NO_PAD.encode(salt)
}

/// Symmetric key derived from the session password and a document salt.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct DerivedKey {
    key: [u8; KEY_LEN],
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Holds one derived key and performs authenticated encryption with it.
///
/// Engines are derived once per distinct salt and owned by the session's
/// engine cache; they are never serialized.
#[derive(Debug)]
pub struct CipherEngine {
    key: DerivedKey,
}

impl CipherEngine {
    /// Derive an engine from a password and the salt/work factor stored
    /// with a document. Password and salt are used as UTF-8 bytes.
    pub fn derive(password: &str, salt: &str, iterations: u32) -> CryptoResult<Self> {
        if iterations == 0 || iterations > MAX_KDF_ITERATIONS {
            return Err(CryptoError::SuspectIterations(iterations));
        }
        let mut key = [0u8; KEY_LEN];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key);
        Ok(Self {
            key: DerivedKey { key },
        })
    }

    fn cipher(&self) -> CryptoResult<ChaCha20Poly1305> {
        ChaCha20Poly1305::new_from_slice(&self.key.key)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
    }

    fn aad(nonce: &[u8; NONCE_LEN]) -> [u8; 1 + NONCE_LEN] {
        let mut aad = [0u8; 1 + NONCE_LEN];
        aad[0] = TOKEN_VERSION;
        aad[1..].copy_from_slice(nonce);
        aad
    }

    /// Encrypt `plaintext` into a self-describing binary token with a
    /// fresh random nonce.
    pub fn encrypt(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let aad = Self::aad(&nonce);
        let ciphertext = self
            .cipher()?
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: &aad,
                },
            )
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let mut token = Vec::with_capacity(1 + NONCE_LEN + ciphertext.len());
        token.push(TOKEN_VERSION);
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&ciphertext);
        Ok(token)
    }

    /// Verify and decrypt a binary token.
    pub fn decrypt(&self, token: &[u8]) -> CryptoResult<Vec<u8>> {
        if token.len() < 1 + NONCE_LEN + TAG_LEN {
            return Err(CryptoError::MalformedToken("token too short"));
        }
        let version = token[0];
        if version != TOKEN_VERSION {
            return Err(CryptoError::UnsupportedVersion(version));
        }

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&token[1..1 + NONCE_LEN]);
        let aad = Self::aad(&nonce);

        self.cipher()?
            .decrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &token[1 + NONCE_LEN..],
                    aad: &aad,
                },
            )
            .map_err(|_| CryptoError::Authentication)
    }

    /// Encrypt to the text-safe form stored in a document body.
    pub fn encrypt_to_text(&self, plaintext: &str) -> CryptoResult<String> {
        Ok(URL_SAFE_NO_PAD.encode(self.encrypt(plaintext.as_bytes())?))
    }

    /// Decode and decrypt a text-safe token back to UTF-8 plaintext.
    pub fn decrypt_from_text(&self, token: &str) -> CryptoResult<String> {
        let raw = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| CryptoError::MalformedToken("not valid base64"))?;
        String::from_utf8(self.decrypt(&raw)?)
            .map_err(|_| CryptoError::MalformedToken("plaintext is not UTF-8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(password: &str) -> CipherEngine {
        CipherEngine::derive(password, "abc123", 1000).unwrap()
    }

    #[test]
    fn test_salt_generation_is_unique_text() {
        let salt1 = generate_salt();
        let salt2 = generate_salt();
        assert_ne!(salt1, salt2);
        assert_eq!(URL_SAFE_NO_PAD.decode(&salt1).unwrap().len(), SALT_LEN);
    }

    #[test]
    fn test_derivation_is_deterministic_per_salt() {
        let a = engine("hunter2");
        let b = engine("hunter2");
        let token = a.encrypt(b"x").unwrap();
        assert_eq!(b.decrypt(&token).unwrap(), b"x");

        let other_salt = CipherEngine::derive("hunter2", "abc124", 1000).unwrap();
        assert!(matches!(
            other_salt.decrypt(&token),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let engine = engine("hunter2");
        let token = engine.encrypt(b"Hello World").unwrap();
        assert_eq!(engine.decrypt(&token).unwrap(), b"Hello World");
    }

    #[test]
    fn test_nonce_is_fresh_per_call() {
        let engine = engine("hunter2");
        let one = engine.encrypt(b"same input").unwrap();
        let two = engine.encrypt(b"same input").unwrap();
        assert_ne!(one, two);
    }

    #[test]
    fn test_wrong_password_fails_closed() {
        let token = engine("hunter2").encrypt(b"Hello World").unwrap();
        let result = engine("wrong").decrypt(&token);
        assert!(matches!(result, Err(CryptoError::Authentication)));
    }

    #[test]
    fn test_tampered_token_fails_closed() {
        let engine = engine("hunter2");
        let mut token = engine.encrypt(b"payload").unwrap();

        let last = token.len() - 1;
        token[last] ^= 0x01;
        assert!(matches!(
            engine.decrypt(&token),
            Err(CryptoError::Authentication)
        ));

        // flipping the nonce must also fail: the tag covers it
        let mut token = engine.encrypt(b"payload").unwrap();
        token[3] ^= 0x01;
        assert!(matches!(
            engine.decrypt(&token),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn test_unknown_version_is_detected() {
        let engine = engine("hunter2");
        let mut token = engine.encrypt(b"payload").unwrap();
        token[0] = 9;
        assert!(matches!(
            engine.decrypt(&token),
            Err(CryptoError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn test_truncated_token_is_malformed() {
        let engine = engine("hunter2");
        assert!(matches!(
            engine.decrypt(&[TOKEN_VERSION, 0, 0]),
            Err(CryptoError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_suspect_iteration_counts_rejected() {
        assert!(matches!(
            CipherEngine::derive("p", "s", 0),
            Err(CryptoError::SuspectIterations(0))
        ));
        assert!(CipherEngine::derive("p", "s", MAX_KDF_ITERATIONS + 1).is_err());
    }

    #[test]
    fn test_text_token_round_trip() {
        let engine = engine("hunter2");
        let token = engine.encrypt_to_text("Hello World").unwrap();
        assert!(token.is_ascii());
        assert_eq!(engine.decrypt_from_text(&token).unwrap(), "Hello World");

        assert!(matches!(
            engine.decrypt_from_text("!!! not base64 !!!"),
            Err(CryptoError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_key_debug_is_redacted() {
        let engine = engine("hunter2");
        assert!(format!("{:?}", engine).contains("REDACTED"));
    }
}
