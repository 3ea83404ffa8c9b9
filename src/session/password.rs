//! The single in-memory password for an editing session.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Password supplied by the user for the current editing session.
///
/// An empty secret means "no password available" — a legitimate state,
/// e.g. after a dismissed dialog. Held in memory only; zeroized on drop.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SessionPassword {
    secret: String,
    /// Carried across a re-encrypt so the new file offers the same hint
    hint: String,
}

impl SessionPassword {
    pub fn new(secret: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            hint: hint.into(),
        }
    }

    /// The "no password available" value.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn is_valid(&self) -> bool {
        !self.secret.is_empty()
    }
}

impl std::fmt::Debug for SessionPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPassword")
            .field("secret", &"[REDACTED]")
            .field("hint", &self.hint)
            .finish()
    }
}
