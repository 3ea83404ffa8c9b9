use std::path::Path;

use anyhow::bail;

use vellum::document::suggested_decrypted_path;
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
        .unwrap_or_else(|| suggested_decrypted_path(path));
    if session.decrypt_to(&dest, force)? {
        println!("decrypted copy written to {}", dest.display());
        Ok(())
    } else {
        bail!("decryption cancelled; nothing written");
    }
}
