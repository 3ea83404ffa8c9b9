//! Document encryption lifecycle.
//!
//! This module provides:
//! - The [`EditorSession`] state machine for open/save/encrypt/decrypt
//! - The [`Prompter`] collaborator boundary for passwords and dialogs
//! - Lifecycle states and the opened-document model

mod errors;
mod lifecycle;
mod models;
mod prompts;

pub use errors::{DocumentError, DocumentResult};
pub use lifecycle::EditorSession;
pub use models::{
    suggested_decrypted_path, suggested_encrypted_path, DocumentState, OpenedDocument,
    ENCRYPTED_SUFFIX,
};
pub use prompts::{Prompter, ScriptedPrompter};
