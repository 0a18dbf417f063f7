use super::{Project, ProjectOptions};
use crate::capture::LineRange;
use crate::executor::RenameExecutor;
use crate::lock::LockFile;
use crate::log::OperationLog;
use crate::output::RenameResult;
use crate::preview::{render_diff, should_use_color, Preview};
use crate::store::{DiskStore, OverlayStore};
use anyhow::{Context, Result};
use std::path::Path;

/// Rename operation - renames one symbol in a file, a line range or the project
pub fn rename_operation(
    old: &str,
    new: &str,
    file: Option<&Path>,
    lines: Option<LineRange>,
    dry_run: bool,
    preview: Preview,
    options: &ProjectOptions,
) -> Result<(RenameResult, Option<String>)> {
    let project = Project::open(options)?;
    let scope = project.scope(file, lines, &options.paths)?;

    // Dry runs never write, so they do not need the lock
    let _lock = if dry_run {
        None
    } else {
        Some(
            LockFile::acquire(&project.state_dir())
                .context("Failed to acquire lock for refactor operation")?,
        )
    };

    let log = if dry_run {
        OperationLog::disabled()
    } else {
        OperationLog::open(&project.state_dir()).context("Failed to open refactor.log")?
    };
    log.log(format!("Rename {} -> {} in {}", old, new, scope));

    let executor = RenameExecutor::new(project.source.as_ref(), &project.filter, &log);
    let outcome = if dry_run {
        executor.execute(&mut OverlayStore::new(), old, new, &scope)
    } else {
        executor.execute(&mut DiskStore, old, new, &scope)
    }
    .with_context(|| format!("Failed to rename '{}' to '{}'", old, new))?;

    log.log(format!(
        "Rename {} -> {} finished: {} changes in {} files, {} failures",
        old,
        new,
        outcome.changes(),
        outcome.files_touched.len(),
        outcome.failures.len()
    ));

    let use_color = should_use_color(options.use_color.or(project.config.defaults.use_color));
    let preview_content = if preview == Preview::None || outcome.changed_locations.is_empty() {
        None
    } else {
        Some(render_diff(&outcome.changed_locations, old, new, use_color))
    };

    Ok((
        RenameResult {
            old: old.to_string(),
            new: new.to_string(),
            dry_run,
            outcome,
        },
        preview_content,
    ))
}
