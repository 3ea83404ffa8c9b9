//! Terminal-backed prompter for the CLI.

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password};

use vellum::session::SessionPassword;
use vellum::Prompter;

#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for TerminalPrompter {
    fn prompt_for_password(&mut self, hint: &str) -> Option<String> {
        if !hint.is_empty() {
            eprintln!("Hint: {hint}");
        }
        Password::with_theme(&self.theme)
            .with_prompt("Password")
            .allow_empty_password(true)
            .interact()
            .ok()
            .filter(|secret| !secret.is_empty())
    }

    fn prompt_for_new_password(&mut self) -> Option<SessionPassword> {
        let secret = Password::with_theme(&self.theme)
            .with_prompt("New password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()
            .ok()?;
        if secret.is_empty() {
            return None;
        }
        let hint: String = Input::with_theme(&self.theme)
            .with_prompt("Password hint (optional)")
            .allow_empty(true)
            .interact_text()
            .unwrap_or_default();
        Some(SessionPassword::new(secret, hint))
    }

    fn confirm(&mut self, _title: &str, text: &str) -> bool {
        Confirm::with_theme(&self.theme)
            .with_prompt(text)
            .default(false)
            .interact()
            .unwrap_or(false)
    }

    fn notify(&mut self, title: &str, text: &str) {
        eprintln!("{title}: {text}");
    }
}
