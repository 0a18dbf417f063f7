use super::batch::BACKUPS_DIR;
use super::{Project, ProjectOptions};
use crate::error::RefactorError;
use crate::lock::LockFile;
use crate::log::OperationLog;
use crate::output::RestoreResult;
use crate::snapshot::{DirectorySnapshot, Snapshot};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Snapshot id that resolves to the most recent batch.
pub const LATEST: &str = "latest";

/// Snapshot directory for `id`. Batch ids start with a timestamp, so the
/// latest one sorts last.
fn resolve_snapshot(backups_dir: &Path, id: &str) -> Result<(String, PathBuf)> {
    if id != LATEST {
        let dir = backups_dir.join(id);
        if !dir.is_dir() {
            return Err(anyhow!(RefactorError::invalid(format!(
                "no snapshot named '{}'",
                id
            ))));
        }
        return Ok((id.to_string(), dir));
    }

    let mut ids: Vec<String> = match fs::read_dir(backups_dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    ids.sort();

    let latest = ids
        .pop()
        .ok_or_else(|| anyhow!(RefactorError::invalid("no batch snapshots to restore")))?;
    let dir = backups_dir.join(&latest);
    Ok((latest, dir))
}

/// Restore operation - puts back the files a batch changed, from its snapshot
pub fn restore_operation(id: &str, options: &ProjectOptions) -> Result<RestoreResult> {
    let project = Project::open(options)?;
    let state_dir = project.state_dir();
    let (snapshot, snapshot_dir) = resolve_snapshot(&state_dir.join(BACKUPS_DIR), id)?;

    let _lock =
        LockFile::acquire(&state_dir).context("Failed to acquire lock for refactor operation")?;
    let log = OperationLog::open(&state_dir).context("Failed to open refactor.log")?;

    let restored = DirectorySnapshot::open(&snapshot_dir)
        .and_then(|s| s.restore())
        .with_context(|| format!("Failed to restore snapshot '{}'", snapshot))?;
    log.log(format!("Restore {}: {} files", snapshot, restored.len()));

    Ok(RestoreResult {
        snapshot,
        snapshot_dir,
        restored,
    })
}
