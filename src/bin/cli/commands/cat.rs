use std::path::Path;

use anyhow::bail;

use vellum::{DocumentState, EditorSession, Prompter};

pub fn run<P: Prompter>(session: &mut EditorSession<P>, path: &Path) -> anyhow::Result<()> {
    match session.open(path)? {
        DocumentState::PlainOpen | DocumentState::EncryptedOpen => {
            if let Some(doc) = session.current() {
                println!("{}", doc.content);
            }
            Ok(())
        }
        DocumentState::EncryptedLocked => bail!("{} stayed locked", path.display()),
        DocumentState::Unloaded => bail!("could not open {}", path.display()),
    }
}
