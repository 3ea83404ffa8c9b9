//! The document encryption lifecycle.
//!
//! [`EditorSession`] reconciles one in-session password against possibly
//! many differently-salted encrypted files. Cryptographic failures are
//! never fatal: they turn into prompts, a password reset, or a fallback
//! to the default document. The attempt ceiling bounds every retry loop.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::crypto::generate_salt;
use crate::header::{self, DocumentHeader, EncryptionParams};
use crate::session::{SessionContext, SessionPassword};
use crate::settings::EditorSettings;

use super::errors::{DocumentError, DocumentResult};
use super::models::{DocumentState, OpenedDocument};
use super::prompts::Prompter;

/// Wrong guesses allowed before opening stops prompting and falls back.
const MAX_UNLOCK_ATTEMPTS: u32 = 3;

/// One editing session: the session password and engine cache, the
/// currently open document, and the user-interaction collaborator.
pub struct EditorSession<P: Prompter> {
    prompter: P,
    settings: EditorSettings,
    session: SessionContext,
    /// Opened instead of the requested file when unlocking fails
    fallback_path: PathBuf,
    current: Option<OpenedDocument>,
    /// Remembered answer of the empty-save confirmation
    allow_empty_save: Option<bool>,
}

impl<P: Prompter> EditorSession<P> {
    pub fn new(prompter: P, settings: EditorSettings, fallback_path: impl Into<PathBuf>) -> Self {
        Self {
            prompter,
            settings,
            session: SessionContext::new(),
            fallback_path: fallback_path.into(),
            current: None,
            allow_empty_save: None,
        }
    }

    pub fn state(&self) -> DocumentState {
        self.current
            .as_ref()
            .map(|doc| doc.state)
            .unwrap_or(DocumentState::Unloaded)
    }

    pub fn current(&self) -> Option<&OpenedDocument> {
        self.current.as_ref()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn prompter_mut(&mut self) -> &mut P {
        &mut self.prompter
    }

    /// Clear the session password and every cached engine.
    pub fn reset_password(&mut self) {
        self.session.reset_password();
    }

    /// Forget the remembered empty-save answer; the next empty save asks
    /// again.
    pub fn reset_empty_save_answer(&mut self) {
        self.allow_empty_save = None;
    }

    /// Open the document at `path`.
    ///
    /// Plaintext documents (including headerless legacy files) open
    /// directly. Encrypted documents are unlocked with the session
    /// password, prompting for one when none is set; after
    /// [`MAX_UNLOCK_ATTEMPTS`] wrong guesses — counted across files, and
    /// cleared only by a successful decrypt — the session stops prompting
    /// and opens the fallback document instead.
    pub fn open(&mut self, path: &Path) -> DocumentResult<DocumentState> {
        let raw = fs::read_to_string(path)?;
        let (header, body) = header::load(&raw);

        let params = match header.encryption().cloned() {
            Some(params) => params,
            None => {
                debug!("opened {} as plaintext", path.display());
                self.current = Some(OpenedDocument::new(
                    path.to_path_buf(),
                    header,
                    body,
                    DocumentState::PlainOpen,
                ));
                return Ok(DocumentState::PlainOpen);
            }
        };

        loop {
            if !self.session.is_password_valid() {
                if self.session.failed_attempts() >= MAX_UNLOCK_ATTEMPTS {
                    warn!("unlock attempt limit reached; opening fallback document");
                    self.session.reset_password();
                    return self.open_fallback("Too many failed password attempts");
                }
                match self.prompter.prompt_for_password(&params.hint) {
                    Some(secret) => {
                        // a guess counts toward the ceiling until some
                        // decrypt succeeds
                        self.session.record_failure();
                        self.session
                            .set_password(SessionPassword::new(secret, params.hint.clone()));
                        continue;
                    }
                    None => {
                        debug!("password prompt dismissed for {}", path.display());
                        return self.open_fallback("No password supplied");
                    }
                }
            }

            match self.session.decrypt_text(&body, &params.salt, params.iterations) {
                Ok(Some(plaintext)) => {
                    self.session.record_success();
                    info!("unlocked {}", path.display());
                    self.current = Some(OpenedDocument::new(
                        path.to_path_buf(),
                        header,
                        plaintext,
                        DocumentState::EncryptedOpen,
                    ));
                    return Ok(DocumentState::EncryptedOpen);
                }
                Ok(None) => {
                    // password vanished between the check and the attempt;
                    // treat like a dismissed prompt
                    return self.open_fallback("No password supplied");
                }
                Err(err) => {
                    warn!("decrypt failed for {}: {err}", path.display());
                    if self.unlocked_elsewhere(path) {
                        // the session password provably fits another file
                        self.prompter.notify(
                            "Password mismatch",
                            "This document was encrypted with a different password.",
                        );
                        if self.session.failed_attempts() >= MAX_UNLOCK_ATTEMPTS {
                            self.session.reset_password();
                            return self.open_fallback("Too many failed password attempts");
                        }
                        if self.prompter.confirm(
                            "Password mismatch",
                            "Reset the session password and try a different one?",
                        ) {
                            self.session.reset_password();
                            continue;
                        }
                        self.current = Some(OpenedDocument::new(
                            path.to_path_buf(),
                            header,
                            body,
                            DocumentState::EncryptedLocked,
                        ));
                        return Ok(DocumentState::EncryptedLocked);
                    }
                    // the guess is simply wrong; nothing vouches for it
                    self.session.reset_password();
                    return self.open_fallback("Wrong password");
                }
            }
        }
    }

    /// True when a *different* file is currently open under the session
    /// password.
    fn unlocked_elsewhere(&self, path: &Path) -> bool {
        self.current
            .as_ref()
            .map_or(false, |doc| {
                doc.state == DocumentState::EncryptedOpen && doc.path != path
            })
    }

    /// Open the default document instead of the one that failed. The
    /// fallback never re-enters the unlock flow: an encrypted or
    /// unreadable fallback leaves the session unloaded.
    fn open_fallback(&mut self, reason: &str) -> DocumentResult<DocumentState> {
        self.prompter.notify("Document locked", reason);
        let fallback = self.fallback_path.clone();

        match fs::read_to_string(&fallback) {
            Ok(raw) => {
                let (header, body) = header::load(&raw);
                if header.is_encrypted() {
                    warn!(
                        "fallback document {} is itself encrypted; leaving session unloaded",
                        fallback.display()
                    );
                    self.current = None;
                    return Ok(DocumentState::Unloaded);
                }
                info!("opened fallback document {}", fallback.display());
                self.current = Some(OpenedDocument::new(
                    fallback,
                    header,
                    body,
                    DocumentState::PlainOpen,
                ));
                Ok(DocumentState::PlainOpen)
            }
            Err(err) => {
                warn!("cannot open fallback document {}: {err}", fallback.display());
                self.current = None;
                Ok(DocumentState::Unloaded)
            }
        }
    }

    /// Write `content` back to the current document's own path.
    ///
    /// Encrypted documents are re-encrypted with their own stored
    /// salt/iterations, never the session defaults. Saving empty content
    /// over a non-empty document asks once per session. Returns `false`
    /// when the save was declined.
    pub fn save(&mut self, content: &str) -> DocumentResult<bool> {
        let state = match self.current.as_ref() {
            Some(doc) => doc.state,
            None => return Err(DocumentError::NoDocument),
        };
        if state == DocumentState::EncryptedLocked {
            return Err(DocumentError::Locked);
        }

        let previous_empty = self
            .current
            .as_ref()
            .map_or(true, |doc| doc.content.is_empty());
        if content.is_empty() && !previous_empty {
            let allowed = match self.allow_empty_save {
                Some(answer) => answer,
                None => {
                    let answer = self.prompter.confirm(
                        "Save empty document",
                        "The document is empty. Overwrite the previous content?",
                    );
                    // remembered for the rest of the session
                    self.allow_empty_save = Some(answer);
                    answer
                }
            };
            if !allowed {
                debug!("empty save declined");
                return Ok(false);
            }
        }

        let doc = self.current.as_mut().ok_or(DocumentError::NoDocument)?;
        if !doc.header.is_valid() {
            doc.header = DocumentHeader::new();
        }
        doc.header.refresh()?;

        let stored_body = if state == DocumentState::EncryptedOpen {
            let params = doc
                .header
                .encryption()
                .cloned()
                .ok_or(DocumentError::NotEncrypted)?;
            self.session
                .encrypt_text(content, &params.salt, params.iterations)?
                .ok_or(DocumentError::NoPassword)?
        } else {
            content.to_string()
        };

        fs::write(&doc.path, header::pack_bytes(&doc.header, &stored_body))?;
        doc.content = content.to_string();
        info!("saved {}", doc.path.display());
        Ok(true)
    }

    /// Write a password-encrypted copy of the current plaintext document
    /// to `dest`.
    ///
    /// Generates fresh [`EncryptionParams`] (new salt, the current
    /// default work factor) and prompts for a first-time password when
    /// the session has none. An existing destination asks for overwrite
    /// confirmation; confirming re-invokes the operation with
    /// `overwrite` approved so the question is asked at most once.
    /// Returns `false` when the user backed out.
    pub fn encrypt_to(&mut self, dest: &Path, overwrite: bool) -> DocumentResult<bool> {
        let (content, mut header) = {
            let doc = self.current.as_ref().ok_or(DocumentError::NoDocument)?;
            if doc.header.is_encrypted() {
                return Err(DocumentError::AlreadyEncrypted);
            }
            (doc.content.clone(), doc.header.clone())
        };

        if dest.exists() && !overwrite {
            let message = format!("{} already exists. Overwrite it?", dest.display());
            if self.prompter.confirm("Overwrite file", &message) {
                return self.encrypt_to(dest, true);
            }
            debug!("encrypt declined: destination exists");
            return Ok(false);
        }

        if !self.session.is_password_valid() {
            match self.prompter.prompt_for_new_password() {
                Some(password) => self.session.set_password(password),
                None => {
                    debug!("new-password prompt dismissed; nothing written");
                    return Ok(false);
                }
            }
        }

        let params = EncryptionParams::new(
            generate_salt(),
            self.settings.kdf_iterations,
            self.session.password().hint(),
        );

        if !header.is_valid() {
            header = DocumentHeader::new();
        }
        header.set_encryption(params.clone())?;
        header.refresh()?;

        let token = self
            .session
            .encrypt_text(&content, &params.salt, params.iterations)?
            .ok_or(DocumentError::NoPassword)?;
        fs::write(dest, header::pack_bytes(&header, &token))?;
        info!("encrypted copy written to {}", dest.display());
        Ok(true)
    }

    /// Write a decrypted copy of the current encrypted document to
    /// `dest`, with a fresh encryption-free header.
    ///
    /// Always uses the document's own stored salt/iterations. A failed
    /// decrypt here is terminal for the operation: the source file is
    /// left untouched, the user is notified, and there is no retry loop.
    /// Overwrite semantics mirror [`EditorSession::encrypt_to`].
    pub fn decrypt_to(&mut self, dest: &Path, overwrite: bool) -> DocumentResult<bool> {
        let (state, stored_body, mut header, params) = {
            let doc = self.current.as_ref().ok_or(DocumentError::NoDocument)?;
            let params = doc
                .header
                .encryption()
                .cloned()
                .ok_or(DocumentError::NotEncrypted)?;
            (doc.state, doc.content.clone(), doc.header.clone(), params)
        };

        if dest.exists() && !overwrite {
            let message = format!("{} already exists. Overwrite it?", dest.display());
            if self.prompter.confirm("Overwrite file", &message) {
                return self.decrypt_to(dest, true);
            }
            debug!("decrypt declined: destination exists");
            return Ok(false);
        }

        let plaintext = if state == DocumentState::EncryptedOpen {
            // already verified for this file
            stored_body
        } else {
            if !self.session.is_password_valid() {
                match self.prompter.prompt_for_password(&params.hint) {
                    Some(secret) => self
                        .session
                        .set_password(SessionPassword::new(secret, params.hint.clone())),
                    None => {
                        debug!("password prompt dismissed; nothing written");
                        return Ok(false);
                    }
                }
            }
            match self
                .session
                .decrypt_text(&stored_body, &params.salt, params.iterations)
            {
                Ok(Some(plaintext)) => {
                    self.session.record_success();
                    plaintext
                }
                Ok(None) => return Ok(false),
                Err(err) => {
                    warn!("terminal decrypt failure: {err}");
                    self.prompter.notify(
                        "Decrypt failed",
                        "The password does not match this document. The file was left unchanged.",
                    );
                    return Err(err.into());
                }
            }
        };

        header.clear_encryption()?;
        header.refresh()?;
        fs::write(dest, header::pack_bytes(&header, &plaintext))?;
        info!("decrypted copy written to {}", dest.display());
        Ok(true)
    }
}
