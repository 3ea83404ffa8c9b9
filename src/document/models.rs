//! Document lifecycle data models

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::header::DocumentHeader;

/// Where the current document sits in the encryption lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentState {
    /// No document is loaded
    #[default]
    Unloaded,
    /// Plaintext document, editable
    PlainOpen,
    /// Header marks the document encrypted; no verified password yet
    EncryptedLocked,
    /// Password verified for this file, plaintext held in memory
    EncryptedOpen,
}

/// A document loaded into the session.
#[derive(Debug, Clone)]
pub struct OpenedDocument {
    pub path: PathBuf,
    pub header: DocumentHeader,
    /// Decrypted text for open documents; the raw stored body while
    /// locked
    pub content: String,
    pub state: DocumentState,
}

impl OpenedDocument {
    pub(crate) fn new(
        path: PathBuf,
        header: DocumentHeader,
        content: String,
        state: DocumentState,
    ) -> Self {
        Self {
            path,
            header,
            content,
            state,
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(
            self.state,
            DocumentState::PlainOpen | DocumentState::EncryptedOpen
        )
    }
}

/// Historic naming convention for encrypted copies. Suggestion only: the
/// header, not the filename, decides whether a file is encrypted.
pub const ENCRYPTED_SUFFIX: &str = ".locked";

/// Suggested destination for an encrypted copy of `path`.
pub fn suggested_encrypted_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(ENCRYPTED_SUFFIX);
    PathBuf::from(name)
}

/// Suggested destination for a decrypted copy of `path`: the legacy
/// suffix is stripped if present, otherwise ".txt" is appended.
pub fn suggested_decrypted_path(path: &Path) -> PathBuf {
    if let Some(stripped) = path
        .to_str()
        .and_then(|s| s.strip_suffix(ENCRYPTED_SUFFIX))
    {
        return PathBuf::from(stripped);
    }
    let mut name = OsString::from(path.as_os_str());
    name.push(".txt");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggested_paths_round_trip() {
        let plain = Path::new("notes/journal.md");
        let locked = suggested_encrypted_path(plain);
        assert_eq!(locked, Path::new("notes/journal.md.locked"));
        assert_eq!(suggested_decrypted_path(&locked), plain);
    }

    #[test]
    fn test_decrypted_suggestion_without_suffix() {
        assert_eq!(
            suggested_decrypted_path(Path::new("secret.bin")),
            Path::new("secret.bin.txt")
        );
    }
}
