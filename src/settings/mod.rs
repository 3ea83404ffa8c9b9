//! Persisted editor settings relevant to encryption.
//!
//! Only the encryption-related setting lives here: the KDF work factor
//! used for *newly* encrypted documents. Decryption never consults it —
//! the count stored in the document's own header always wins.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::DEFAULT_KDF_ITERATIONS;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data directory not found")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorSettings {
    /// KDF work factor for newly encrypted documents
    #[serde(default = "default_iterations")]
    pub kdf_iterations: u32,
}

fn default_iterations() -> u32 {
    DEFAULT_KDF_ITERATIONS
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            kdf_iterations: DEFAULT_KDF_ITERATIONS,
        }
    }
}

impl EditorSettings {
    /// Default settings file under the per-user data directory.
    pub fn default_path() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("vellum").join("settings.json"))
            .ok_or(SettingsError::DataDirNotFound)
    }

    /// Load settings from `path`; a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
