//! Batch orchestrator.
//!
//! Runs a [`BatchPlan`] step by step through the executor and folds each
//! step's outcome back onto the mapping it came from.
//!
//! There is no batch transaction. Steps run strictly in plan order, each one
//! fully finished before the next starts, and an interruption between steps
//! leaves the earlier steps applied. Snapshots taken before every step are the
//! way back from a partial batch. Running two batches against the same files
//! at once is not supported; the CLI takes a lock file to refuse it.

use crate::error::Result;
use crate::executor::{ChangedLocation, FileFailure, RenameExecutor, RenameScope};
use crate::log::OperationLog;
use crate::planner::{plan_batch_with, AmbiguousDependency, BatchPlan, RenameMapping, TEMP_PREFIX};
use crate::query::CaptureSource;
use crate::search::{find_candidates, FileFilter};
use crate::snapshot::{NoSnapshot, Snapshot};
use crate::store::{DiskStore, FileStore, OverlayStore};
use crate::vcs::VcsHook;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

static TEMP_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{}[A-Za-z0-9_$]*", regex::escape(TEMP_PREFIX))).unwrap()
});

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub roots: Vec<PathBuf>,
    pub filter: FileFilter,
    pub dry_run: bool,
}

/// Net effect of one requested mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingReport {
    pub old: String,
    pub new: String,
    pub changes: usize,
    pub files_touched: Vec<PathBuf>,
    #[serde(skip)]
    pub locations: Vec<ChangedLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub mapping: Vec<MappingReport>,
    pub total_changes: usize,
    pub total_files: usize,
    pub circular_renames: usize,
    pub dry_run: bool,
    pub steps_executed: usize,
    pub interrupted: bool,
    pub warnings: Vec<String>,
    pub ambiguities: Vec<AmbiguousDependency>,
    pub failures: Vec<FileFailure>,
}

pub struct BatchRunner<'a> {
    source: &'a dyn CaptureSource,
    log: OperationLog,
    snapshot: Box<dyn Snapshot + 'a>,
    vcs: Option<Box<dyn VcsHook + 'a>>,
    interrupt: Option<Arc<AtomicBool>>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(source: &'a dyn CaptureSource) -> Self {
        Self {
            source,
            log: OperationLog::disabled(),
            snapshot: Box::new(NoSnapshot),
            vcs: None,
            interrupt: None,
        }
    }

    #[must_use]
    pub fn with_log(mut self, log: OperationLog) -> Self {
        self.log = log;
        self
    }

    #[must_use]
    pub fn with_snapshot(mut self, snapshot: impl Snapshot + 'a) -> Self {
        self.snapshot = Box::new(snapshot);
        self
    }

    #[must_use]
    pub fn with_vcs(mut self, vcs: impl VcsHook + 'a) -> Self {
        self.vcs = Some(Box::new(vcs));
        self
    }

    /// Checked between steps. Once set, no further step starts.
    #[must_use]
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    fn interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Temporary names already present anywhere in the project.
    fn existing_temp_names(&self, store: &dyn FileStore, options: &BatchOptions) -> Result<HashSet<String>> {
        let mut names = HashSet::new();
        for path in find_candidates(store, &options.roots, &options.filter, &[TEMP_PREFIX])? {
            if let Ok(content) = store.read(&path) {
                let content = String::from_utf8_lossy(&content);
                names.extend(TEMP_NAME.find_iter(&content).map(|m| m.as_str().to_string()));
            }
        }
        Ok(names)
    }

    /// Plan against the project's current names without running anything.
    pub fn plan(&self, mappings: &[RenameMapping], options: &BatchOptions) -> Result<BatchPlan> {
        let taken = self.existing_temp_names(&DiskStore, options)?;
        plan_batch_with(mappings, &|name| taken.contains(name))
    }

    pub fn run(&mut self, mappings: &[RenameMapping], options: &BatchOptions) -> Result<BatchReport> {
        let plan = self.plan(mappings, options)?;

        if options.dry_run {
            self.execute(mappings, &plan, options, &mut OverlayStore::new())
        } else {
            self.execute(mappings, &plan, options, &mut DiskStore)
        }
    }

    fn execute(
        &mut self,
        mappings: &[RenameMapping],
        plan: &BatchPlan,
        options: &BatchOptions,
        store: &mut dyn FileStore,
    ) -> Result<BatchReport> {
        let mut report = BatchReport {
            mapping: mappings
                .iter()
                .map(|m| MappingReport {
                    old: m.old.clone(),
                    new: m.new.clone(),
                    ..MappingReport::default()
                })
                .collect(),
            circular_renames: plan.circular_renames(),
            dry_run: options.dry_run,
            ambiguities: plan.ambiguities.clone(),
            ..BatchReport::default()
        };

        for ambiguity in &plan.ambiguities {
            let warning = format!(
                "'{}' is the old name of mappings {:?}; ordered after mapping {} only",
                mappings[ambiguity.mapping].new,
                ambiguity.candidates.iter().map(|c| c + 1).collect::<Vec<_>>(),
                ambiguity.chosen + 1
            );
            self.log.log(format!("WARNING {}", warning));
            report.warnings.push(warning);
        }

        self.log.log(format!(
            "Batch of {} mappings in {} steps{}",
            mappings.len(),
            plan.steps.len(),
            if options.dry_run { " (dry run)" } else { "" }
        ));

        let roots = if options.roots.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            options.roots.clone()
        };
        let scope = RenameScope::Project { roots };
        let executor = RenameExecutor::new(self.source, &options.filter, &self.log);

        let mut touched_by_mapping: Vec<BTreeSet<PathBuf>> = vec![BTreeSet::new(); mappings.len()];
        let mut touched = BTreeSet::new();

        for (number, step) in plan.steps.iter().enumerate() {
            if self.interrupted() {
                report.interrupted = true;
                self.log.log(format!(
                    "Interrupted before step {} of {}",
                    number + 1,
                    plan.steps.len()
                ));
                break;
            }

            if !options.dry_run {
                let files = executor.candidate_files(&*store, &step.old, &scope)?;
                let label = format!("step-{:03}", number + 1);
                if let Err(e) = self.snapshot.snapshot(&label, &files) {
                    let warning = format!("snapshot before step {} failed, batch stopped: {}", number + 1, e);
                    self.log.log(format!("ERROR {}", warning));
                    report.warnings.push(warning);
                    report.interrupted = true;
                    break;
                }
            }

            self.log.log(format!(
                "Step {}: {} -> {}{}",
                number + 1,
                step.old,
                step.new,
                if step.is_temp { " (temp)" } else { "" }
            ));

            let outcome = executor.execute(store, &step.old, &step.new, &scope)?;
            report.steps_executed += 1;

            let origin = step.origin_mapping_index;
            let mapping = &mut report.mapping[origin];
            // Count a cycle member once, on the step that moves its old name
            if step.old == mapping.old {
                mapping.changes += outcome.changes();
                mapping.locations.extend(outcome.changed_locations);
            }
            touched_by_mapping[origin].extend(outcome.files_touched.iter().cloned());
            touched.extend(outcome.files_touched);

            report
                .failures
                .extend(outcome.failures.into_iter().map(|failure| FileFailure {
                    mapping: Some(origin),
                    ..failure
                }));
        }

        for (mapping, files) in report.mapping.iter_mut().zip(touched_by_mapping) {
            mapping.files_touched = files.into_iter().collect();
        }
        report.total_changes = report.mapping.iter().map(|m| m.changes).sum();
        report.total_files = touched.len();

        if !report.interrupted {
            for (index, mapping) in report.mapping.iter().enumerate() {
                let failed = report.failures.iter().any(|f| f.mapping == Some(index));
                if mapping.changes == 0 && !failed {
                    let warning = format!("'{}' was not found", mapping.old);
                    self.log.log(format!("WARNING {}", warning));
                    report.warnings.push(warning);
                }
            }
        }

        if !options.dry_run && !report.interrupted && report.total_changes > 0 {
            if let Some(vcs) = &self.vcs {
                let files: Vec<PathBuf> = touched.into_iter().collect();
                let message = commit_message(mappings);
                match vcs.commit(&message, &files) {
                    Ok(result) => self.log.log(format!("VCS: {}", result)),
                    Err(e) => {
                        let warning = format!("commit failed: {:#}", e);
                        self.log.log(format!("WARNING {}", warning));
                        report.warnings.push(warning);
                    },
                }
            }
        }

        self.log.log(format!(
            "Batch {}: {} changes in {} files, {} of {} steps",
            if report.interrupted { "stopped" } else { "finished" },
            report.total_changes,
            report.total_files,
            report.steps_executed,
            plan.steps.len()
        ));

        Ok(report)
    }
}

fn commit_message(mappings: &[RenameMapping]) -> String {
    match mappings {
        [single] => format!("refactor: rename {}", single),
        _ => {
            let mut message = format!("refactor: batch rename of {} symbols\n", mappings.len());
            for mapping in mappings {
                message.push_str(&format!("\n{}", mapping));
            }
            message
        },
    }
}

/// Run a batch over `options.roots` with no log, snapshots or commit.
pub fn run_batch(
    source: &dyn CaptureSource,
    mappings: &[RenameMapping],
    options: &BatchOptions,
) -> Result<BatchReport> {
    BatchRunner::new(source).run(mappings, options)
}
