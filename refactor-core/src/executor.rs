//! Single rename executor.
//!
//! Applies one `old -> new` substitution over a scope. All file access goes
//! through a [`FileStore`], so a dry run is the same code path run against an
//! [`OverlayStore`].

use crate::capture::{is_identifier_byte, is_valid_identifier, LineRange, SourceLocation};
use crate::classifier::{classify, Role};
use crate::error::{RefactorError, Result};
use crate::locator::{find_occurrences, Occurrence};
use crate::log::OperationLog;
use crate::query::CaptureSource;
use crate::search::{find_candidates, FileFilter};
use crate::store::{DiskStore, FileStore, OverlayStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenameScope {
    File { path: PathBuf },
    Lines { path: PathBuf, range: LineRange },
    Project { roots: Vec<PathBuf> },
}

impl RenameScope {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    pub fn lines(path: impl Into<PathBuf>, range: LineRange) -> Self {
        Self::Lines {
            path: path.into(),
            range,
        }
    }

    pub fn project(root: impl Into<PathBuf>) -> Self {
        Self::Project {
            roots: vec![root.into()],
        }
    }

    fn range(&self) -> Option<LineRange> {
        match self {
            Self::Lines { range, .. } => Some(*range),
            _ => None,
        }
    }
}

impl std::fmt::Display for RenameScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File { path } => write!(f, "{}", path.display()),
            Self::Lines { path, range } => write!(f, "{}:{}", path.display(), range),
            Self::Project { roots } => {
                let roots: Vec<_> = roots.iter().map(|r| r.display().to_string()).collect();
                write!(f, "{}", roots.join(", "))
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedLocation {
    pub location: SourceLocation,
    pub role: Role,
    pub before: String,
    pub after: String,
}

/// A file that could not be processed. Other files are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFailure {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<usize>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameOutcome {
    pub changed_locations: Vec<ChangedLocation>,
    pub files_touched: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl RenameOutcome {
    pub fn changes(&self) -> usize {
        self.changed_locations.len()
    }
}

pub fn validate_names(old: &str, new: &str) -> Result<()> {
    for name in [old, new] {
        if !is_valid_identifier(name) {
            return Err(RefactorError::invalid(format!(
                "'{}' is not a valid identifier",
                name
            )));
        }
    }
    if old == new {
        return Err(RefactorError::invalid(format!(
            "old and new names are both '{}'",
            old
        )));
    }
    Ok(())
}

pub struct RenameExecutor<'a> {
    source: &'a dyn CaptureSource,
    filter: &'a FileFilter,
    log: &'a OperationLog,
}

impl<'a> RenameExecutor<'a> {
    pub fn new(source: &'a dyn CaptureSource, filter: &'a FileFilter, log: &'a OperationLog) -> Self {
        Self {
            source,
            filter,
            log,
        }
    }

    /// Files the rename may touch: the scoped file, or every project file
    /// whose bytes contain `old`.
    pub fn candidate_files(
        &self,
        store: &dyn FileStore,
        old: &str,
        scope: &RenameScope,
    ) -> Result<Vec<PathBuf>> {
        match scope {
            RenameScope::File { path } | RenameScope::Lines { path, .. } => {
                if !store.exists(path) {
                    return Err(RefactorError::FileNotFound(path.clone()));
                }
                Ok(vec![path.clone()])
            },
            RenameScope::Project { roots } => find_candidates(store, roots, self.filter, &[old]),
        }
    }

    /// Occurrences of `name` in scope, without changing anything.
    pub fn find(
        &self,
        store: &dyn FileStore,
        name: &str,
        scope: &RenameScope,
    ) -> Result<(Vec<Occurrence>, Vec<FileFailure>)> {
        if !is_valid_identifier(name) {
            return Err(RefactorError::invalid(format!(
                "'{}' is not a valid identifier",
                name
            )));
        }

        let mut occurrences = Vec::new();
        let mut failures = Vec::new();
        for path in self.candidate_files(store, name, scope)? {
            let located = read_text(store, &path).and_then(|content| {
                find_occurrences(self.source, &path, &content, name, scope.range())
                    .map_err(|e| e.to_string())
            });
            match located {
                Ok(found) => occurrences.extend(found),
                Err(message) => failures.push(FileFailure {
                    path,
                    mapping: None,
                    message,
                }),
            }
        }
        Ok((occurrences, failures))
    }

    /// Rename every occurrence of `old` in scope to `new`.
    pub fn execute(
        &self,
        store: &mut dyn FileStore,
        old: &str,
        new: &str,
        scope: &RenameScope,
    ) -> Result<RenameOutcome> {
        validate_names(old, new)?;

        let mut outcome = RenameOutcome::default();
        let mut touched = BTreeSet::new();

        for path in self.candidate_files(&*store, old, scope)? {
            match self.rename_in_file(store, &path, old, new, scope.range()) {
                Ok(changes) if changes.is_empty() => {},
                Ok(changes) => {
                    self.log.log(format!(
                        "{}: {} -> {} ({} changes)",
                        path.display(),
                        old,
                        new,
                        changes.len()
                    ));
                    touched.insert(path);
                    outcome.changed_locations.extend(changes);
                },
                Err(message) => {
                    self.log
                        .log(format!("FAILED {}: {}", path.display(), message));
                    outcome.failures.push(FileFailure {
                        path,
                        mapping: None,
                        message,
                    });
                },
            }
        }

        outcome.files_touched = touched.into_iter().collect();
        Ok(outcome)
    }

    fn rename_in_file(
        &self,
        store: &mut dyn FileStore,
        path: &Path,
        old: &str,
        new: &str,
        range: Option<LineRange>,
    ) -> std::result::Result<Vec<ChangedLocation>, String> {
        let content = read_text(&*store, path)?;
        let occurrences = find_occurrences(self.source, path, &content, old, range)
            .map_err(|e| e.to_string())?;
        if occurrences.is_empty() {
            return Ok(Vec::new());
        }

        let (rewritten, changes) = rewrite(&content, &occurrences, old, new)?;
        store
            .write(path, rewritten.as_bytes())
            .map_err(|e| format!("failed to write: {}", e))?;
        Ok(changes)
    }
}

fn read_text(store: &dyn FileStore, path: &Path) -> std::result::Result<String, String> {
    let bytes = store
        .read(path)
        .map_err(|e| format!("failed to read: {}", e))?;
    String::from_utf8(bytes).map_err(|_| "file is not valid UTF-8".to_string())
}

/// Byte offset of the start of each line.
fn line_starts(content: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(content.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

fn line_text<'a>(content: &'a str, starts: &[usize], line: usize) -> &'a str {
    let start = starts[line - 1];
    let end = starts.get(line).map_or(content.len(), |next| next - 1);
    content[start..end].trim_end_matches('\r')
}

/// Replace exactly the given spans in one pass.
///
/// Every span is checked first: it must hold `old` with no identifier byte on
/// either side. Any mismatch rejects the whole file.
fn rewrite(
    content: &str,
    occurrences: &[Occurrence],
    old: &str,
    new: &str,
) -> std::result::Result<(String, Vec<ChangedLocation>), String> {
    let starts = line_starts(content);
    let bytes = content.as_bytes();

    let mut offsets = Vec::with_capacity(occurrences.len());
    for occurrence in occurrences {
        let line = occurrence.line();
        let offset = line
            .checked_sub(1)
            .and_then(|index| starts.get(index))
            .map(|start| start + occurrence.column())
            .ok_or_else(|| format!("{} is outside the file", occurrence.location))?;

        let end = offset + old.len();
        let matches = content.get(offset..end) == Some(old)
            && (offset == 0 || !is_identifier_byte(bytes[offset - 1]))
            && (end == bytes.len() || !is_identifier_byte(bytes[end]));
        if !matches {
            return Err(format!(
                "{} does not hold '{}' as a whole identifier",
                occurrence.location, old
            ));
        }
        offsets.push(offset);
    }

    let mut rewritten = String::with_capacity(content.len() + occurrences.len() * new.len());
    let mut cursor = 0;
    for &offset in &offsets {
        rewritten.push_str(&content[cursor..offset]);
        rewritten.push_str(new);
        cursor = offset + old.len();
    }
    rewritten.push_str(&content[cursor..]);

    // Names hold no newlines, so line numbers are unchanged
    let new_starts = line_starts(&rewritten);
    let changes = occurrences
        .iter()
        .map(|occurrence| ChangedLocation {
            location: occurrence.location.clone(),
            role: classify(occurrence),
            before: line_text(content, &starts, occurrence.line()).to_string(),
            after: line_text(&rewritten, &new_starts, occurrence.line()).to_string(),
        })
        .collect();

    Ok((rewritten, changes))
}

/// Rename `old` to `new` in `scope` on disk, or preview it with `dry_run`.
///
/// A dry run reports exactly what a real run would change and never writes.
pub fn rename_symbol(
    source: &dyn CaptureSource,
    filter: &FileFilter,
    old: &str,
    new: &str,
    scope: &RenameScope,
    dry_run: bool,
) -> Result<RenameOutcome> {
    let log = OperationLog::disabled();
    let executor = RenameExecutor::new(source, filter, &log);
    if dry_run {
        executor.execute(&mut OverlayStore::new(), old, new, scope)
    } else {
        executor.execute(&mut DiskStore, old, new, scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Capture, CaptureKind};
    use crate::query::LexicalSource;
    use std::fs;
    use tempfile::TempDir;

    fn rename_file(content: &str, old: &str, new: &str) -> (String, RenameOutcome) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.rs");
        fs::write(&path, content).unwrap();
        let outcome = rename_symbol(
            &LexicalSource,
            &FileFilter::default(),
            old,
            new,
            &RenameScope::file(&path),
            false,
        )
        .unwrap();
        (fs::read_to_string(&path).unwrap(), outcome)
    }

    #[test]
    fn test_renames_only_code() {
        let (content, outcome) = rename_file(
            "// target here\nfn target() { let s = \"target\"; target(); }\n",
            "target",
            "aim",
        );
        assert_eq!(
            content,
            "// target here\nfn aim() { let s = \"target\"; aim(); }\n"
        );
        assert_eq!(outcome.changes(), 2);
        assert_eq!(outcome.files_touched.len(), 1);
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn test_word_boundaries() {
        let (content, outcome) = rename_file("let id = id2 + myid + id;\n", "id", "identifier2");
        assert_eq!(content, "let identifier2 = id2 + myid + identifier2;\n");
        assert_eq!(outcome.changes(), 2);
    }

    #[test]
    fn test_change_records_line_before_and_after() {
        let (_, outcome) = rename_file("fn a() {}\nfn b() { a(); a(); }\n", "a", "z");
        let second = &outcome.changed_locations[1];
        assert_eq!(second.location.line, 2);
        assert_eq!(second.before, "fn b() { a(); a(); }");
        assert_eq!(second.after, "fn b() { z(); z(); }");
        assert_eq!(outcome.changed_locations[0].role, Role::Definition);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let scope = RenameScope::project(temp_dir.path());
        let filter = FileFilter::default();
        for (old, new) in [("a", "a"), ("", "b"), ("a", "1b"), ("a b", "c")] {
            let err = rename_symbol(&LexicalSource, &filter, old, new, &scope, true).unwrap_err();
            assert!(err.is_input_error(), "{} -> {}", old, new);
        }
    }

    #[test]
    fn test_missing_scoped_file_is_input_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = rename_symbol(
            &LexicalSource,
            &FileFilter::default(),
            "a",
            "b",
            &RenameScope::file(temp_dir.path().join("missing.rs")),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, RefactorError::FileNotFound(_)));
    }

    #[test]
    fn test_span_mismatch_fails_that_file_only() {
        struct Misplaced;
        impl CaptureSource for Misplaced {
            fn captures(&self, path: &Path, _: &str, name: &str) -> Result<Vec<Capture>> {
                Ok(vec![Capture::new(
                    CaptureKind::Reference,
                    SourceLocation::new(path, 1, 1),
                    name,
                )])
            }
        }

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.rs");
        fs::write(&path, "foo();\n").unwrap();

        let outcome = rename_symbol(
            &Misplaced,
            &FileFilter::default(),
            "foo",
            "bar",
            &RenameScope::file(&path),
            false,
        )
        .unwrap();
        assert_eq!(outcome.changes(), 0);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "foo();\n");
    }

    #[test]
    fn test_rewrite_handles_crlf_lines() {
        let (content, outcome) = rename_file("fn a() {}\r\na();\r\n", "a", "b");
        assert_eq!(content, "fn b() {}\r\nb();\r\n");
        assert_eq!(outcome.changed_locations[1].after, "b();");
    }

    #[test]
    fn test_line_text_borrows_from_content() {
        let content = String::from("first\r\nsecond\nlast");
        let starts = line_starts(&content);
        let lines: Vec<&str> = (1..=3).map(|line| line_text(&content, &starts, line)).collect();
        drop(starts);
        assert_eq!(lines, vec!["first", "second", "last"]);
    }
}
