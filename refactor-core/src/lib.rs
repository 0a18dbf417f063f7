#![allow(unused)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Syntax-aware identifier renaming.
//!
//! Occurrences come from a [`CaptureSource`]: an external AST query tool
//! through [`QueryCommand`], or the built-in [`LexicalSource`]. Single
//! renames go through [`RenameExecutor`]; mapping sets are ordered by
//! [`plan_batch`] and run by [`BatchRunner`].

pub mod batch;
pub mod capture;
pub mod classifier;
pub mod config;
pub mod error;
pub mod executor;
pub mod locator;
pub mod lock;
pub mod log;
pub mod mapping;
pub mod operations;
pub mod output;
pub mod planner;
pub mod preview;
pub mod query;
pub mod search;
pub mod snapshot;
pub mod store;
pub mod vcs;

pub use batch::{run_batch, BatchOptions, BatchReport, BatchRunner, MappingReport};
pub use capture::{is_valid_identifier, Capture, CaptureKind, LineRange, SourceLocation};
pub use classifier::{classify, Role, RoleCounts};
pub use config::Config;
pub use error::{RefactorError, Result};
pub use executor::{
    rename_symbol, ChangedLocation, FileFailure, RenameExecutor, RenameOutcome, RenameScope,
};
pub use locator::{find_occurrences, select_occurrences, Occurrence};
pub use lock::LockFile;
pub use log::OperationLog;
pub use mapping::{load_mappings, parse_mappings, parse_pairs};
pub use operations::{
    batch_operation, find_operation, plan_operation, rename_operation, restore_operation,
    BatchFlags, ProjectOptions,
};
pub use output::{
    BatchResult, FindResult, OutputFormat, OutputFormatter, PlanResult, RenameResult,
    RestoreResult, VersionResult,
};
pub use planner::{
    plan_batch, plan_batch_with, AmbiguousDependency, BatchPlan, ExecutionStep, RenameMapping,
};
pub use preview::Preview;
pub use query::{CaptureSource, LexicalSource, QueryCommand};
pub use search::{configure_walker, find_candidates, FileFilter};
pub use snapshot::{DirectorySnapshot, NoSnapshot, Snapshot};
pub use store::{DiskStore, FileStore, OverlayStore};
pub use vcs::{GitCommit, VcsHook};
