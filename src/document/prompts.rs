//! User-interaction boundary of the document lifecycle.
//!
//! The lifecycle depends on this trait, never on a concrete dialog
//! implementation. Tests use [`ScriptedPrompter`]; the CLI supplies a
//! terminal-backed one.

use std::collections::VecDeque;

use crate::session::SessionPassword;

/// Collaborator the lifecycle calls out to for passwords, confirmations
/// and notices.
///
/// Returning `None` from a password prompt means the dialog was
/// dismissed; the lifecycle treats that as "no password supplied",
/// never as an error.
pub trait Prompter {
    /// Modal password request when unlocking an encrypted document.
    fn prompt_for_password(&mut self, hint: &str) -> Option<String>;

    /// Modal request for a first-time encryption password plus optional
    /// hint. Distinct from unlocking: there is no existing password to
    /// match.
    fn prompt_for_new_password(&mut self) -> Option<SessionPassword>;

    /// Generic yes/no, used for overwrite and empty-save confirmations.
    fn confirm(&mut self, title: &str, text: &str) -> bool;

    /// One-shot notice (password mismatch, fallback, I/O failure).
    fn notify(&mut self, title: &str, text: &str);
}

/// Scripted prompter for tests: answers are queued ahead of time and
/// every interaction is recorded. An exhausted queue behaves like a
/// dismissed dialog.
#[derive(Default)]
pub struct ScriptedPrompter {
    passwords: VecDeque<Option<String>>,
    new_passwords: VecDeque<Option<SessionPassword>>,
    confirms: VecDeque<bool>,
    /// `"title: text"` for every notice shown
    pub notices: Vec<String>,
    /// Number of unlock password prompts shown
    pub password_prompts: u32,
    /// Number of confirmation dialogs shown
    pub confirm_prompts: u32,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_password(&mut self, secret: &str) {
        self.passwords.push_back(Some(secret.to_string()));
    }

    pub fn queue_password_cancel(&mut self) {
        self.passwords.push_back(None);
    }

    pub fn queue_new_password(&mut self, secret: &str, hint: &str) {
        self.new_passwords
            .push_back(Some(SessionPassword::new(secret, hint)));
    }

    pub fn queue_new_password_cancel(&mut self) {
        self.new_passwords.push_back(None);
    }

    pub fn queue_confirm(&mut self, answer: bool) {
        self.confirms.push_back(answer);
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt_for_password(&mut self, _hint: &str) -> Option<String> {
        self.password_prompts += 1;
        self.passwords.pop_front().flatten()
    }

    fn prompt_for_new_password(&mut self) -> Option<SessionPassword> {
        self.new_passwords.pop_front().flatten()
    }

    fn confirm(&mut self, _title: &str, _text: &str) -> bool {
        self.confirm_prompts += 1;
        self.confirms.pop_front().unwrap_or(false)
    }

    fn notify(&mut self, title: &str, text: &str) {
        self.notices.push(format!("{title}: {text}"));
    }
}
