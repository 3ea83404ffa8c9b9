//! End-to-end lifecycle tests over real files in a temp directory.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use vellum::document::{suggested_encrypted_path, ScriptedPrompter};
use vellum::{header, DocumentState, EditorSession, EditorSettings};

const TEST_ITERATIONS: u32 = 1000;

fn new_session(dir: &TempDir) -> EditorSession<ScriptedPrompter> {
    let fallback = dir.path().join("welcome.md");
    if !fallback.exists() {
        fs::write(&fallback, "# Welcome\n").unwrap();
    }
    EditorSession::new(
        ScriptedPrompter::new(),
        EditorSettings {
            kdf_iterations: TEST_ITERATIONS,
        },
        fallback,
    )
}

#[test]
fn plain_document_full_cycle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.md");
    fs::write(&path, "# My Notes\nSome text").unwrap();

    // legacy file without a header opens as plain content
    let mut session = new_session(&dir);
    assert_eq!(session.open(&path).unwrap(), DocumentState::PlainOpen);
    assert_eq!(session.current().unwrap().content, "# My Notes\nSome text");

    // saving gives it a header; reopening keeps the content
    assert!(session.save("# My Notes\nEdited text").unwrap());
    let mut reader = new_session(&dir);
    reader.open(&path).unwrap();
    assert!(reader.current().unwrap().header.is_valid());
    assert_eq!(reader.current().unwrap().content, "# My Notes\nEdited text");
}

#[test]
fn encrypt_reopen_save_decrypt_cycle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("journal.md");
    fs::write(&path, "Hello World").unwrap();

    // encrypt to the suggested destination
    let mut session = new_session(&dir);
    session.open(&path).unwrap();
    session
        .prompter_mut()
        .queue_new_password("hunter2", "usual one");
    let locked = suggested_encrypted_path(&path);
    assert!(session.encrypt_to(&locked, false).unwrap());

    // the stored file is a header plus an opaque token
    let (stored_header, stored_body) = header::load(&fs::read_to_string(&locked).unwrap());
    assert!(stored_header.is_encrypted());
    assert_eq!(stored_header.encryption().unwrap().hint, "usual one");
    assert!(!stored_body.contains("Hello World"));

    // a fresh session unlocks it with the prompted password
    let mut reader = new_session(&dir);
    reader.prompter_mut().queue_password("hunter2");
    assert_eq!(
        reader.open(&locked).unwrap(),
        DocumentState::EncryptedOpen
    );
    assert_eq!(reader.current().unwrap().content, "Hello World");

    // an encrypted save round-trips through yet another session
    assert!(reader.save("Hello again").unwrap());
    let mut third = new_session(&dir);
    third.prompter_mut().queue_password("hunter2");
    third.open(&locked).unwrap();
    assert_eq!(third.current().unwrap().content, "Hello again");

    // decrypting writes a plain copy and leaves the source encrypted
    let plain_copy = dir.path().join("journal-plain.md");
    assert!(third.decrypt_to(&plain_copy, false).unwrap());
    let (copy_header, copy_body) = header::load(&fs::read_to_string(&plain_copy).unwrap());
    assert!(copy_header.is_valid());
    assert!(!copy_header.is_encrypted());
    assert_eq!(copy_body, "Hello again");
    let (source_header, _) = header::load(&fs::read_to_string(&locked).unwrap());
    assert!(source_header.is_encrypted());
}

#[test]
fn wrong_password_never_leaks_content() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("secret.md");
    fs::write(&path, "the launch codes").unwrap();

    let mut writer = new_session(&dir);
    writer.open(&path).unwrap();
    writer.prompter_mut().queue_new_password("hunter2", "");
    let locked = dir.path().join("secret.md.locked");
    assert!(writer.encrypt_to(&locked, false).unwrap());

    let mut reader = new_session(&dir);
    reader.prompter_mut().queue_password("wrong");
    let state = reader.open(&locked).unwrap();

    // fell back to the default document; nothing decrypted
    assert_eq!(state, DocumentState::PlainOpen);
    assert_eq!(reader.current().unwrap().content, "# Welcome\n");
    assert!(!reader.session().is_password_valid());
}

#[test]
fn retry_ceiling_ends_in_fallback_without_a_fourth_prompt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("secret.md");
    fs::write(&path, "contents").unwrap();

    let mut writer = new_session(&dir);
    writer.open(&path).unwrap();
    writer.prompter_mut().queue_new_password("right", "");
    let locked = dir.path().join("secret.md.locked");
    assert!(writer.encrypt_to(&locked, false).unwrap());

    let mut reader = new_session(&dir);
    for guess in ["a", "b", "c"] {
        reader.prompter_mut().queue_password(guess);
        assert_eq!(reader.open(&locked).unwrap(), DocumentState::PlainOpen);
    }
    assert_eq!(reader.prompter().password_prompts, 3);

    assert_eq!(reader.open(&locked).unwrap(), DocumentState::PlainOpen);
    assert_eq!(reader.prompter().password_prompts, 3);
}
