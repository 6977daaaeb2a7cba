//! Macro file storage - one text file holding every macro
//!
//! First line is a header (`MC4D-MACROS <version>`), the rest is the
//! registry dump.

use crate::codec::LineReader;
use crate::registry::MacroManager;
use anyhow::Context;
use mc4d_core::{Error, GripGeometry, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const MAGIC: &str = "MC4D-MACROS";
pub const FILE_VERSION: u32 = 1;

const BACKUP_PREFIX: &str = "macros_";
const EXTENSION: &str = "txt";

#[derive(Debug, Clone)]
pub struct MacroStorage {
    path: PathBuf,
    backup_dir: PathBuf,
}

impl MacroStorage {
    /// `~/.mc4d/macros.txt`
    pub fn new() -> anyhow::Result<Self> {
        let home = std::env::var("HOME").context("HOME not set")?;
        let dir = PathBuf::from(home).join(".mc4d");
        fs::create_dir_all(&dir)?;
        Ok(Self::with_path(dir.join("macros.txt")))
    }

    /// Backups go to a `backups/` directory next to the file.
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let backup_dir = path
            .parent()
            .map(|p| p.join("backups"))
            .unwrap_or_else(|| PathBuf::from("backups"));
        Self { path, backup_dir }
    }

    pub fn backup_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.backup_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty registry; nobody has saved macros yet.
    pub fn load(&self, geometry: Arc<dyn GripGeometry>) -> Result<MacroManager> {
        let mut manager = MacroManager::new(geometry);
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no macro file yet");
            return Ok(manager);
        }
        self.load_into(&mut manager)?;
        Ok(manager)
    }

    /// Replaces `manager`'s macros with the file's. On any error `manager`
    /// is left as it was.
    pub fn load_into(&self, manager: &mut MacroManager) -> Result<usize> {
        let file = File::open(&self.path)?;
        let mut lines = LineReader::new(BufReader::new(file));
        let header = lines.next_line("file header")?.to_owned();
        check_header(&header).map_err(|reason| Error::malformed(1, &reason))?;
        let count = manager.read_lines(&mut lines)?;
        tracing::info!(path = %self.path.display(), count, "loaded macro file");
        Ok(count)
    }

    /// Writes to a sibling temp file first so a failed save never truncates
    /// the existing macros.
    pub fn save(&self, manager: &MacroManager) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        write_file(&tmp, manager)?;
        fs::rename(&tmp, &self.path)?;
        tracing::info!(path = %self.path.display(), count = manager.len(), "saved macro file");
        Ok(())
    }

    /// Timestamped copy of `manager` in the backup directory.
    pub fn backup(&self, manager: &MacroManager) -> Result<PathBuf> {
        fs::create_dir_all(&self.backup_dir)?;
        let ts = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let path = self
            .backup_dir
            .join(format!("{}{}.{}", BACKUP_PREFIX, ts, EXTENSION));
        write_file(&path, manager)?;
        tracing::info!(path = %path.display(), "wrote macro backup");
        Ok(path)
    }

    /// Backup file names, oldest first.
    pub fn list_backups(&self) -> Result<Vec<String>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.backup_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if let Some(s) = name.to_str() {
                if s.starts_with(BACKUP_PREFIX) && s.ends_with(EXTENSION) {
                    files.push(s.to_string());
                }
            }
        }
        files.sort();
        Ok(files)
    }

    pub fn delete(&self) -> Result<()> {
        fs::remove_file(&self.path)?;
        Ok(())
    }
}

fn write_file(path: &Path, manager: &MacroManager) -> Result<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);
    writeln!(w, "{} {}", MAGIC, FILE_VERSION)?;
    manager.dump(&mut w)?;
    w.flush()?;
    Ok(())
}

fn check_header(line: &str) -> std::result::Result<(), String> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(MAGIC), Some(v), None) => match v.parse::<u32>() {
            Ok(FILE_VERSION) => Ok(()),
            Ok(other) => Err(format!("unsupported macro file version {}", other)),
            Err(_) => Err(format!("bad version '{}'", v)),
        },
        _ => Err(format!("not a macro file (expected '{} {}')", MAGIC, FILE_VERSION)),
    }
}
