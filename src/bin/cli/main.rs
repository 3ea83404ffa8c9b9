mod commands;
mod prompt;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use vellum::{EditorSession, EditorSettings};

#[derive(Parser)]
#[command(name = "vellum-cli", about = "Vellum encrypted document CLI", version)]
struct Cli {
    /// Settings file (default: per-user data dir)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Document opened instead when unlocking fails
    #[arg(long, global = true, default_value = "welcome.md")]
    fallback: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a document's header metadata
    Info {
        /// Document path
        path: PathBuf,
    },

    /// Print a document's content, unlocking it if necessary
    Cat {
        /// Document path
        path: PathBuf,
    },

    /// Write a password-encrypted copy of a plaintext document
    Encrypt {
        /// Source document
        path: PathBuf,
        /// Destination (default: source path + ".locked")
        #[arg(long)]
        dest: Option<PathBuf>,
        /// Overwrite the destination without asking
        #[arg(long)]
        force: bool,
    },

    /// Write a decrypted copy of an encrypted document
    Decrypt {
        /// Source document
        path: PathBuf,
        /// Destination (default: source path without ".locked")
        #[arg(long)]
        dest: Option<PathBuf>,
        /// Overwrite the destination without asking
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => EditorSettings::load_or_default(path)?,
        None => EditorSettings::load_or_default(&EditorSettings::default_path()?)?,
    };
    let mut session = EditorSession::new(prompt::TerminalPrompter::new(), settings, &cli.fallback);

    match cli.command {
        Command::Info { path } => commands::info::run(&path),
        Command::Cat { path } => commands::cat::run(&mut session, &path),
        Command::Encrypt { path, dest, force } => {
            commands::encrypt::run(&mut session, &path, dest.as_deref(), force)
        }
        Command::Decrypt { path, dest, force } => {
            commands::decrypt::run(&mut session, &path, dest.as_deref(), force)
        }
    }
}
