use std::path::Path;

use anyhow::bail;

use vellum::document::suggested_encrypted_path;
use vellum::{EditorSession, Prompter};

pub fn run<P: Prompter>(
    session: &mut EditorSession<P>,
    path: &Path,
    dest: Option<&Path>,
    force: bool,
) -> anyhow::Result<()> {
    session.open(path)?;
    if session.current().map_or(true, |doc| doc.path != path) {
        bail!("could not open {}", path.display());
    }

    let dest = dest
        .map(Path::to_path_buf)
        .unwrap_or_else(|| suggested_encrypted_path(path));
    if session.encrypt_to(&dest, force)? {
        println!("encrypted copy written to {}", dest.display());
        Ok(())
    } else {
        bail!("encryption cancelled; nothing written");
    }
}
