use crate::error::Result;
use crate::store::{DiskStore, FileStore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "manifest.json";

/// Backup collaborator called before each destructive batch step.
pub trait Snapshot {
    /// Save the current content of `files` under `label`.
    fn snapshot(&mut self, label: &str, files: &[PathBuf]) -> Result<()>;

    /// Put every snapshotted file back to its earliest saved content.
    /// Returns the restored paths.
    fn restore(&self) -> Result<Vec<PathBuf>>;
}

/// Snapshotting turned off.
#[derive(Debug, Default)]
pub struct NoSnapshot;

impl Snapshot for NoSnapshot {
    fn snapshot(&mut self, _label: &str, _files: &[PathBuf]) -> Result<()> {
        Ok(())
    }

    fn restore(&self) -> Result<Vec<PathBuf>> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub label: String,
    pub original_path: PathBuf,
    pub backup_path: PathBuf,
    pub checksum: String,
}

/// Copies files to `<backups>/<batch id>/<label>/<sha256 of path>` and keeps
/// a JSON manifest next to them.
#[derive(Debug)]
pub struct DirectorySnapshot {
    dir: PathBuf,
    entries: Vec<SnapshotEntry>,
}

impl DirectorySnapshot {
    pub fn create(backups_dir: &Path, batch_id: &str) -> Result<Self> {
        let dir = backups_dir.join(batch_id);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            entries: Vec::new(),
        })
    }

    /// Reopen a snapshot written by an earlier run. A batch that never
    /// touched a file leaves no manifest, which reads as no entries.
    pub fn open(dir: &Path) -> Result<Self> {
        let manifest_path = dir.join(MANIFEST_FILE);
        let entries = if manifest_path.is_file() {
            let manifest = fs::read_to_string(manifest_path)?;
            serde_json::from_str(&manifest).map_err(io::Error::from)?
        } else {
            Vec::new()
        };
        Ok(Self {
            dir: dir.to_path_buf(),
            entries,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    fn write_manifest(&self) -> Result<()> {
        let file = File::create(self.dir.join(MANIFEST_FILE))?;
        serde_json::to_writer_pretty(file, &self.entries).map_err(io::Error::from)?;
        Ok(())
    }
}

fn path_key(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn calculate_checksum(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

impl Snapshot for DirectorySnapshot {
    fn snapshot(&mut self, label: &str, files: &[PathBuf]) -> Result<()> {
        if files.is_empty() {
            return Ok(());
        }
        let label_dir = self.dir.join(label);
        fs::create_dir_all(&label_dir)?;

        for file in files {
            let backup_path = label_dir.join(path_key(file));
            fs::copy(file, &backup_path)?;
            self.entries.push(SnapshotEntry {
                label: label.to_string(),
                original_path: file.clone(),
                backup_path,
                checksum: calculate_checksum(file)?,
            });
        }
        self.write_manifest()
    }

    fn restore(&self) -> Result<Vec<PathBuf>> {
        let mut store = DiskStore;
        let mut restored = Vec::new();
        let mut seen = HashSet::new();

        for entry in &self.entries {
            if !seen.insert(&entry.original_path) {
                continue;
            }
            let content = fs::read(&entry.backup_path)?;
            if store.exists(&entry.original_path) {
                store.write(&entry.original_path, &content)?;
            } else {
                fs::write(&entry.original_path, &content)?;
            }
            restored.push(entry.original_path.clone());
        }
        Ok(restored)
    }
}
