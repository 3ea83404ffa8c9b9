//! Session-wide encryption state.
//!
//! One password is active per editing session. The [`SessionContext`]
//! owns it together with the per-salt engine cache and the failed-unlock
//! counter; it is constructor-injected into the document lifecycle, never
//! global state.

mod cache;
mod password;

pub use cache::EngineCache;
pub use password::SessionPassword;

use std::sync::Arc;

use log::debug;

use crate::crypto::{CipherEngine, CryptoResult};

#[derive(Default)]
pub struct SessionContext {
    password: SessionPassword,
    engines: EngineCache,
    failed_attempts: u32,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn password(&self) -> &SessionPassword {
        &self.password
    }

    /// Install a new session password. Engines derived from the previous
    /// password are stale and are dropped.
    pub fn set_password(&mut self, password: SessionPassword) {
        self.engines.invalidate_all();
        self.password = password;
    }

    /// Clear the password and every cached engine.
    pub fn reset_password(&mut self) {
        debug!("resetting session password and cached engines");
        self.password = SessionPassword::empty();
        self.engines.invalidate_all();
    }

    pub fn is_password_valid(&self) -> bool {
        self.password.is_valid()
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    /// Count a wrong password guess toward the session ceiling.
    pub fn record_failure(&mut self) -> u32 {
        self.failed_attempts += 1;
        self.failed_attempts
    }

    /// A successful decrypt is the only thing that clears the counter;
    /// merely opening a different file does not.
    pub fn record_success(&mut self) {
        self.failed_attempts = 0;
    }

    /// The engine for `salt`, or `None` when no password is set.
    pub fn engine(&self, salt: &str, iterations: u32) -> CryptoResult<Option<Arc<CipherEngine>>> {
        if !self.password.is_valid() {
            return Ok(None);
        }
        self.engines
            .get_or_create(self.password.secret(), salt, iterations)
            .map(Some)
    }

    /// Encrypt text for the document identified by `salt`/`iterations`.
    /// `Ok(None)` when no password is available: callers must treat that
    /// as a legitimate, if insecure, state rather than an error.
    pub fn encrypt_text(
        &self,
        plaintext: &str,
        salt: &str,
        iterations: u32,
    ) -> CryptoResult<Option<String>> {
        match self.engine(salt, iterations)? {
            Some(engine) => engine.encrypt_to_text(plaintext).map(Some),
            None => Ok(None),
        }
    }

    /// Decrypt a stored text token; `Ok(None)` when no password is set.
    pub fn decrypt_text(
        &self,
        token: &str,
        salt: &str,
        iterations: u32,
    ) -> CryptoResult<Option<String>> {
        match self.engine(salt, iterations)? {
            Some(engine) => engine.decrypt_from_text(token).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::CryptoError;

    #[test]
    fn test_empty_password_is_a_no_op() {
        let session = SessionContext::new();
        assert!(!session.is_password_valid());
        assert!(session.encrypt_text("text", "salt", 1000).unwrap().is_none());
        assert!(session.decrypt_text("token", "salt", 1000).unwrap().is_none());
    }

    #[test]
    fn test_encrypt_decrypt_through_session() {
        let mut session = SessionContext::new();
        session.set_password(SessionPassword::new("hunter2", ""));

        let token = session
            .encrypt_text("Hello World", "abc123", 1000)
            .unwrap()
            .unwrap();
        let plain = session.decrypt_text(&token, "abc123", 1000).unwrap().unwrap();
        assert_eq!(plain, "Hello World");
    }

    #[test]
    fn test_wrong_password_fails_closed() {
        let mut session = SessionContext::new();
        session.set_password(SessionPassword::new("hunter2", ""));
        let token = session
            .encrypt_text("Hello World", "abc123", 1000)
            .unwrap()
            .unwrap();

        session.set_password(SessionPassword::new("wrong", ""));
        let result = session.decrypt_text(&token, "abc123", 1000);
        assert!(matches!(result, Err(CryptoError::Authentication)));
    }

    #[test]
    fn test_reset_clears_password_but_not_counter() {
        let mut session = SessionContext::new();
        session.set_password(SessionPassword::new("hunter2", ""));
        session.record_failure();
        session.record_failure();

        session.reset_password();
        assert!(!session.is_password_valid());
        assert_eq!(session.failed_attempts(), 2);

        session.record_success();
        assert_eq!(session.failed_attempts(), 0);
    }

    #[test]
    fn test_new_password_invalidates_engines() {
        let mut session = SessionContext::new();
        session.set_password(SessionPassword::new("hunter2", ""));
        let token = session
            .encrypt_text("secret", "abc123", 1000)
            .unwrap()
            .unwrap();

        // same secret installed again: engines rebuilt, decrypt still works
        session.set_password(SessionPassword::new("hunter2", "hint"));
        assert_eq!(
            session.decrypt_text(&token, "abc123", 1000).unwrap().unwrap(),
            "secret"
        );
    }
}
