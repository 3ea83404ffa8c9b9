use std::fs;
use std::path::Path;

use anyhow::Context;

use vellum::header;

pub fn run(path: &Path) -> anyhow::Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let (header, body) = header::load(&raw);

    if !header.is_valid() {
        println!("{}: no header (plain document)", path.display());
        println!("body: {} bytes", body.len());
        return Ok(());
    }

    if let Some(title) = header.title() {
        println!("title:      {title}");
    }
    if let Some(created) = header.created() {
        println!("created:    {created}");
    }
    if let Some(updated) = header.updated() {
        println!("updated:    {updated}");
    }
    match header.encryption() {
        Some(params) => {
            println!("encrypted:  yes ({} KDF rounds)", params.iterations);
            if !params.hint.is_empty() {
                println!("hint:       {}", params.hint);
            }
        }
        None => println!("encrypted:  no"),
    }
    println!("body:       {} bytes", body.len());
    Ok(())
}
