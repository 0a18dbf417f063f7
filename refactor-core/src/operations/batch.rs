use super::{Project, ProjectOptions};
use crate::batch::{BatchOptions, BatchRunner};
use crate::lock::LockFile;
use crate::log::OperationLog;
use crate::output::BatchResult;
use crate::planner::{mapping_set_hash, validate_mappings, RenameMapping};
use crate::preview::{render_batch, render_diff, should_use_color, Preview};
use crate::snapshot::DirectorySnapshot;
use crate::vcs::GitCommit;
use anyhow::{Context, Result};
use std::fmt::Write;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub const BACKUPS_DIR: &str = "backups";

#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct BatchFlags {
    pub dry_run: bool,
    /// Commit even when the config does not ask for it
    pub commit: bool,
    pub no_snapshot: bool,
}

/// `<timestamp>-<first 8 hex of the mapping set hash>`
fn batch_id(mappings: &[RenameMapping]) -> String {
    let hash = mapping_set_hash(mappings);
    format!(
        "{}-{}",
        chrono::Local::now().format("%Y%m%d-%H%M%S"),
        &hash[..8]
    )
}

/// Batch operation - runs a whole mapping set against the project
pub fn batch_operation(
    mappings: &[RenameMapping],
    flags: BatchFlags,
    preview: Preview,
    interrupt: Option<Arc<AtomicBool>>,
    options: &ProjectOptions,
) -> Result<(BatchResult, Option<String>)> {
    validate_mappings(mappings)?;
    let project = Project::open(options)?;
    let state_dir = project.state_dir();

    let _lock = if flags.dry_run {
        None
    } else {
        Some(LockFile::acquire(&state_dir).context("Failed to acquire lock for refactor operation")?)
    };

    let batch_options = BatchOptions {
        roots: project.roots(&options.paths),
        filter: project.filter.clone(),
        dry_run: flags.dry_run,
    };

    let log = if flags.dry_run {
        OperationLog::disabled()
    } else {
        OperationLog::open(&state_dir).context("Failed to open refactor.log")?
    };
    let log_file = log.path().map(PathBuf::from);

    let mut runner = BatchRunner::new(project.source.as_ref()).with_log(log);
    if let Some(flag) = interrupt {
        runner = runner.with_interrupt(flag);
    }

    let mut snapshot_dir = None;
    if !flags.dry_run && project.config.defaults.create_snapshots && !flags.no_snapshot {
        let snapshot = DirectorySnapshot::create(&state_dir.join(BACKUPS_DIR), &batch_id(mappings))
            .context("Failed to create snapshot directory")?;
        snapshot_dir = Some(snapshot.dir().to_path_buf());
        runner = runner.with_snapshot(snapshot);
    }

    if !flags.dry_run && (flags.commit || project.config.defaults.commit) {
        runner = runner.with_vcs(GitCommit::new(&project.root));
    }

    let report = runner
        .run(mappings, &batch_options)
        .context("Failed to run batch")?;

    let use_color = should_use_color(options.use_color.or(project.config.defaults.use_color));
    let preview_content = match preview {
        Preview::None => None,
        Preview::Table => Some(render_batch(&report, use_color)),
        Preview::Diff => {
            let mut content = String::new();
            for mapping in report.mapping.iter().filter(|m| !m.locations.is_empty()) {
                let _ = writeln!(content, "# {} -> {}", mapping.old, mapping.new);
                content.push_str(&render_diff(&mapping.locations, &mapping.old, &mapping.new, use_color));
            }
            Some(content)
        },
    };

    Ok((
        BatchResult {
            report,
            snapshot_dir,
            log_file,
        },
        preview_content,
    ))
}
