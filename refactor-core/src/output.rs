use crate::batch::BatchReport;
use crate::classifier::{classify, RoleCounts};
use crate::executor::{FileFailure, RenameOutcome};
use crate::locator::Occurrence;
use crate::planner::{BatchPlan, RenameMapping};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::PathBuf;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Json,
}

/// Result of a find operation
#[derive(Debug, Serialize, Deserialize)]
pub struct FindResult {
    pub name: String,
    pub occurrences: Vec<Occurrence>,
    pub failures: Vec<FileFailure>,
}

impl FindResult {
    pub fn counts(&self) -> RoleCounts {
        self.occurrences.iter().collect()
    }

    pub fn files(&self) -> usize {
        self.occurrences
            .iter()
            .map(|o| &o.location.file)
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Result of a single rename
#[derive(Debug, Serialize, Deserialize)]
pub struct RenameResult {
    pub old: String,
    pub new: String,
    pub dry_run: bool,
    pub outcome: RenameOutcome,
}

/// Result of planning a batch without running it
#[derive(Debug, Serialize, Deserialize)]
pub struct PlanResult {
    pub mappings: Vec<RenameMapping>,
    pub plan: BatchPlan,
}

/// Result of a batch run
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResult {
    pub report: BatchReport,
    pub snapshot_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

/// Result of a version command
#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResult {
    pub name: String,
    pub version: String,
}

/// Trait for formatting output in different formats
pub trait OutputFormatter {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.format_json(),
            OutputFormat::Summary => self.format_summary(),
        }
    }
    fn format_json(&self) -> String;
    fn format_summary(&self) -> String;
}

fn write_failures(output: &mut String, failures: &[FileFailure]) {
    for failure in failures {
        writeln!(
            output,
            "✗ {}: {}",
            failure.path.display(),
            failure.message
        )
        .unwrap();
    }
}

impl OutputFormatter for FindResult {
    fn format_json(&self) -> String {
        let occurrences: Vec<_> = self
            .occurrences
            .iter()
            .map(|o| {
                json!({
                    "file": o.location.file,
                    "line": o.line(),
                    "column": o.column(),
                    "kind": o.kind,
                    "role": classify(o),
                })
            })
            .collect();

        serde_json::to_string(&json!({
            "success": true,
            "operation": "find",
            "name": self.name,
            "summary": {
                "occurrences": self.occurrences.len(),
                "files": self.files(),
                "roles": self.counts(),
            },
            "occurrences": occurrences,
            "failures": self.failures,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();
        let counts = self.counts();

        writeln!(
            output,
            "Found {} occurrences of '{}' in {} files",
            self.occurrences.len(),
            self.name,
            self.files()
        )
        .unwrap();

        if !self.occurrences.is_empty() {
            writeln!(
                output,
                "  definitions: {}, references: {}, imports: {}, exports: {}, parameters: {}",
                counts.definitions, counts.references, counts.imports, counts.exports, counts.parameters
            )
            .unwrap();
        }
        write_failures(&mut output, &self.failures);
        output
    }
}

impl OutputFormatter for RenameResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": "rename",
            "old": self.old,
            "new": self.new,
            "dryRun": self.dry_run,
            "changedLocations": self.outcome.changes(),
            "filesTouched": self.outcome.files_touched,
            "changes": self.outcome.changed_locations,
            "failures": self.outcome.failures,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();
        let verb = if self.dry_run { "Would rename" } else { "✓ Renamed" };

        writeln!(
            output,
            "{} '{}' to '{}': {} changes across {} files",
            verb,
            self.old,
            self.new,
            self.outcome.changes(),
            self.outcome.files_touched.len()
        )
        .unwrap();

        if self.outcome.changes() == 0 && self.outcome.failures.is_empty() {
            writeln!(output, "No occurrences of '{}' found", self.old).unwrap();
        }
        write_failures(&mut output, &self.outcome.failures);
        output
    }
}

impl OutputFormatter for PlanResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": "plan",
            "mappings": self.mappings,
            "steps": self.plan.steps,
            "dependsOn": self.plan.depends_on,
            "cycles": self.plan.cycles,
            "circularRenames": self.plan.circular_renames(),
            "ambiguities": self.plan.ambiguities,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();

        writeln!(
            output,
            "{} mappings, {} steps, {} circular renames",
            self.mappings.len(),
            self.plan.steps.len(),
            self.plan.circular_renames()
        )
        .unwrap();

        for (number, step) in self.plan.steps.iter().enumerate() {
            writeln!(
                output,
                "{:>3}. {} -> {}{}",
                number + 1,
                step.old,
                step.new,
                if step.is_temp { "  (cycle)" } else { "" }
            )
            .unwrap();
        }

        for ambiguity in &self.plan.ambiguities {
            writeln!(
                output,
                "! mapping {} could depend on mappings {:?}; using {}",
                ambiguity.mapping + 1,
                ambiguity.candidates.iter().map(|c| c + 1).collect::<Vec<_>>(),
                ambiguity.chosen + 1
            )
            .unwrap();
        }
        output
    }
}

impl OutputFormatter for BatchResult {
    fn format_json(&self) -> String {
        let mut value = serde_json::to_value(&self.report).unwrap_or_default();
        if let Some(object) = value.as_object_mut() {
            object.insert("success".to_string(), json!(true));
            object.insert("operation".to_string(), json!("batch"));
            if let Some(dir) = &self.snapshot_dir {
                object.insert("snapshotDir".to_string(), json!(dir));
            }
        }
        serde_json::to_string(&value).unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let report = &self.report;
        let mut output = String::new();

        if report.dry_run {
            output.push_str("Dry run, no files were changed\n");
        }

        for mapping in &report.mapping {
            writeln!(
                output,
                "  {} -> {}: {} changes in {} files",
                mapping.old,
                mapping.new,
                mapping.changes,
                mapping.files_touched.len()
            )
            .unwrap();
        }

        writeln!(
            output,
            "Total: {} changes across {} files",
            report.total_changes, report.total_files
        )
        .unwrap();
        writeln!(output, "Circular renames: {}", report.circular_renames).unwrap();

        if report.interrupted {
            writeln!(output, "Interrupted after {} steps", report.steps_executed).unwrap();
        }
        for warning in &report.warnings {
            writeln!(output, "! {}", warning).unwrap();
        }
        write_failures(&mut output, &report.failures);

        if let Some(dir) = &self.snapshot_dir {
            writeln!(output, "Snapshots: {}", dir.display()).unwrap();
        }
        output
    }
}

impl OutputFormatter for VersionResult {
    fn format_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        format!("{} {}", self.name, self.version)
    }
}

/// Result of restoring a batch snapshot
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreResult {
    pub snapshot: String,
    pub snapshot_dir: PathBuf,
    pub restored: Vec<PathBuf>,
}

impl OutputFormatter for RestoreResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": "restore",
            "snapshot": self.snapshot,
            "snapshotDir": self.snapshot_dir,
            "restored": self.restored,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();
        if self.restored.is_empty() {
            writeln!(output, "Snapshot '{}' holds no files", self.snapshot).unwrap();
            return output;
        }
        writeln!(
            output,
            "✓ Restored {} files from snapshot '{}'",
            self.restored.len(),
            self.snapshot
        )
        .unwrap();
        for path in &self.restored {
            writeln!(output, "  {}", path.display()).unwrap();
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::MappingReport;
    use crate::capture::{CaptureKind, SourceLocation};
    use crate::planner::plan_batch;

    fn report() -> BatchReport {
        BatchReport {
            mapping: vec![
                MappingReport {
                    old: "A".to_string(),
                    new: "B".to_string(),
                    changes: 3,
                    files_touched: vec![PathBuf::from("a.rs")],
                    locations: Vec::new(),
                },
                MappingReport {
                    old: "B".to_string(),
                    new: "A".to_string(),
                    changes: 2,
                    files_touched: vec![PathBuf::from("a.rs")],
                    locations: Vec::new(),
                },
            ],
            total_changes: 5,
            total_files: 1,
            circular_renames: 2,
            dry_run: true,
            steps_executed: 4,
            ..BatchReport::default()
        }
    }

    #[test]
    fn test_batch_json_uses_camel_case_report() {
        let result = BatchResult {
            report: report(),
            snapshot_dir: None,
            log_file: None,
        };
        let value: serde_json::Value = serde_json::from_str(&result.format_json()).unwrap();
        assert_eq!(value["operation"], "batch");
        assert_eq!(value["totalChanges"], 5);
        assert_eq!(value["totalFiles"], 1);
        assert_eq!(value["circularRenames"], 2);
        assert_eq!(value["dryRun"], true);
        assert_eq!(value["mapping"][0]["old"], "A");
        assert_eq!(value["mapping"][0]["filesTouched"][0], "a.rs");
        assert!(value["mapping"][0].get("locations").is_none());
    }

    #[test]
    fn test_batch_summary() {
        let result = BatchResult {
            report: report(),
            snapshot_dir: None,
            log_file: None,
        };
        let summary = result.format(OutputFormat::Summary);
        assert!(summary.contains("A -> B: 3 changes in 1 files"));
        assert!(summary.contains("Total: 5 changes across 1 files"));
        assert!(summary.contains("Circular renames: 2"));
        assert!(summary.contains("Dry run"));
    }

    #[test]
    fn test_find_summary_counts_roles() {
        let result = FindResult {
            name: "load".to_string(),
            occurrences: vec![
                Occurrence {
                    kind: CaptureKind::Definition,
                    location: SourceLocation::new("a.rs", 1, 3),
                    text: "load".to_string(),
                },
                Occurrence {
                    kind: CaptureKind::Reference,
                    location: SourceLocation::new("b.rs", 4, 0),
                    text: "load".to_string(),
                },
            ],
            failures: Vec::new(),
        };
        let summary = result.format_summary();
        assert!(summary.contains("Found 2 occurrences of 'load' in 2 files"));
        assert!(summary.contains("definitions: 1, references: 1"));

        let value: serde_json::Value = serde_json::from_str(&result.format_json()).unwrap();
        assert_eq!(value["occurrences"][0]["role"], "definition");
        assert_eq!(value["summary"]["roles"]["references"], 1);
    }

    #[test]
    fn test_rename_zero_matches_is_reported() {
        let result = RenameResult {
            old: "gone".to_string(),
            new: "here".to_string(),
            dry_run: false,
            outcome: RenameOutcome::default(),
        };
        let summary = result.format_summary();
        assert!(summary.contains("0 changes across 0 files"));
        assert!(summary.contains("No occurrences of 'gone' found"));
    }

    #[test]
    fn test_plan_summary_lists_steps() {
        let mappings = vec![RenameMapping::new("a", "b"), RenameMapping::new("b", "a")];
        let result = PlanResult {
            plan: plan_batch(&mappings).unwrap(),
            mappings,
        };
        let summary = result.format_summary();
        assert!(summary.contains("2 mappings, 4 steps, 2 circular renames"));
        assert!(summary.contains("  1. a -> __refactor_tmp_"));

        let value: serde_json::Value = serde_json::from_str(&result.format_json()).unwrap();
        assert_eq!(value["steps"][0]["originMappingIndex"], 0);
        assert_eq!(value["steps"][0]["isTemp"], true);
    }

    #[test]
    fn test_version_result() {
        let result = VersionResult {
            name: "refactor".to_string(),
            version: "0.1.0".to_string(),
        };
        assert_eq!(result.format_summary(), "refactor 0.1.0");
        assert!(result.format_json().contains("\"version\":\"0.1.0\""));
    }
}
