//! Macro subsystem configuration

use crate::storage::MacroStorage;
use anyhow::{Context, Result};
use mc4d_core::HypercubeGeometry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroConfig {
    /// Edge length of the hypercube the macros are recorded on
    pub puzzle_length: i32,
    /// Macro file; `~/.mc4d/macros.txt` when unset
    pub macro_file: Option<PathBuf>,
    /// Where backups go; `backups/` next to the macro file when unset
    pub backup_dir: Option<PathBuf>,
}

impl Default for MacroConfig {
    fn default() -> Self {
        Self {
            puzzle_length: 3,
            macro_file: None,
            backup_dir: None,
        }
    }
}

impl MacroConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        if config.puzzle_length < 1 {
            anyhow::bail!("puzzle_length must be positive, got {}", config.puzzle_length);
        }
        Ok(config)
    }

    pub fn geometry(&self) -> HypercubeGeometry {
        HypercubeGeometry::new(self.puzzle_length)
    }

    pub fn storage(&self) -> Result<MacroStorage> {
        let storage = match &self.macro_file {
            Some(path) => MacroStorage::with_path(path),
            None => MacroStorage::new()?,
        };
        Ok(match &self.backup_dir {
            Some(dir) => storage.backup_dir(dir),
            None => storage,
        })
    }
}
