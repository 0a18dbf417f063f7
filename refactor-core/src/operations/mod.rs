//! High-level operations that correspond to CLI commands
//!
//! These modules contain the core business logic for each refactor operation,
//! separated from CLI concerns like argument parsing and output formatting.

pub mod batch;
pub mod find;
pub mod plan;
pub mod rename;
pub mod restore;

// Re-export the main operation functions for easy access
pub use batch::{batch_operation, BatchFlags};
pub use find::find_operation;
pub use plan::plan_operation;
pub use rename::rename_operation;
pub use restore::restore_operation;

use crate::capture::LineRange;
use crate::config::Config;
use crate::executor::RenameScope;
use crate::query::{CaptureSource, QueryCommand};
use crate::search::{FileFilter, STATE_DIR};
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Settings shared by every operation, mostly from global CLI flags.
#[derive(Debug, Clone, Default)]
pub struct ProjectOptions {
    /// Project root; `.refactor/` lives here. Defaults to the current directory.
    pub working_dir: Option<PathBuf>,
    /// Paths to search, relative to the project root. Empty means the root.
    pub paths: Vec<PathBuf>,
    /// Overrides the configured level when set
    pub unrestricted_level: Option<u8>,
    /// Overrides the configured query command when set
    pub query_command: Option<String>,
    pub use_color: Option<bool>,
}

/// A project opened for one operation.
pub(crate) struct Project {
    pub root: PathBuf,
    pub config: Config,
    pub source: Box<dyn CaptureSource>,
    pub filter: FileFilter,
}

impl Project {
    pub fn open(options: &ProjectOptions) -> Result<Self> {
        let root = match &options.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        let root = root.canonicalize().unwrap_or(root);

        let config = Config::load_from_dir(&root).context("Failed to load .refactor/config.toml")?;

        let mut filter = config.filter();
        if let Some(level) = options.unrestricted_level {
            filter.unrestricted_level = level.min(3);
        }

        let source = match &options.query_command {
            Some(command) => {
                let query_file = config.query.query_file.as_ref().map(|q| root.join(q));
                Box::new(QueryCommand::parse(command, query_file)?) as Box<dyn CaptureSource>
            },
            None => config
                .capture_source(&root)
                .context("Failed to set up the query command")?,
        };

        Ok(Self {
            root,
            config,
            source,
            filter,
        })
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Search roots, resolved against the project root.
    pub fn roots(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        if paths.is_empty() {
            return vec![self.root.clone()];
        }
        paths
            .iter()
            .map(|path| {
                let resolved = self.resolve(path);
                resolved.canonicalize().unwrap_or(resolved)
            })
            .collect()
    }

    /// Scope from `--file`, `--lines` and the search paths.
    pub fn scope(
        &self,
        file: Option<&Path>,
        lines: Option<LineRange>,
        paths: &[PathBuf],
    ) -> Result<RenameScope> {
        match (file, lines) {
            (Some(file), Some(range)) => Ok(RenameScope::lines(self.resolve(file), range)),
            (Some(file), None) => Ok(RenameScope::file(self.resolve(file))),
            (None, Some(_)) => Err(anyhow!(crate::error::RefactorError::invalid(
                "--lines requires --file"
            ))),
            (None, None) => Ok(RenameScope::Project {
                roots: self.roots(paths),
            }),
        }
    }
}
