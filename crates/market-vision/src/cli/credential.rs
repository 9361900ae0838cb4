//! Credential persistence in the config file.
//!
//! The key lives at `[client] gemini_api_key` and is edited with `toml_edit`
//! so the rest of the user's file, comments included, is left alone.

use market_vision_core::{CredentialStore, PersistError};
use std::path::{Path, PathBuf};

/// Default credential baked in at build time
/// (`MARKET_VISION_GEMINI_API_KEY=... cargo build`).
pub const BUILD_TIME_KEY: Option<&str> = option_env!("MARKET_VISION_GEMINI_API_KEY");

const SECTION: &str = "client";
const KEY: &str = "gemini_api_key";

/// Stores the credential in a TOML config file.
pub struct ConfigFileStore {
    path: PathBuf,
}

impl ConfigFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<toml_edit::DocumentMut, PersistError> {
        if !self.path.exists() {
            return Ok(toml_edit::DocumentMut::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| PersistError(format!("{}: {e}", self.path.display())))?;
        content
            .parse()
            .map_err(|e| PersistError(format!("{}: {e}", self.path.display())))
    }
}

impl CredentialStore for ConfigFileStore {
    fn load(&self) -> Option<String> {
        let doc = match self.read_document() {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("Could not read stored API key: {e}");
                return None;
            }
        };
        doc.get(SECTION)?
            .get(KEY)?
            .as_str()
            .filter(|k| !k.is_empty())
            .map(String::from)
    }

    fn save(&mut self, credential: &str) -> Result<(), PersistError> {
        let mut doc = self.read_document()?;

        if !doc
            .get(SECTION)
            .is_some_and(|item| item.is_table_like())
        {
            doc[SECTION] = toml_edit::Item::Table(toml_edit::Table::new());
        }
        doc[SECTION][KEY] = toml_edit::value(credential);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PersistError(e.to_string()))?;
        }
        std::fs::write(&self.path, doc.to_string()).map_err(|e| PersistError(e.to_string()))?;

        tracing::debug!("API key saved to {}", self.path.display());
        Ok(())
    }
}

/// Mask a key for display: first and last four characters only.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
