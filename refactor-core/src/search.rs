//! Candidate-file search.
//!
//! A cheap substring pre-filter over the project tree. A hit only means the
//! bytes appear somewhere in the file, possibly inside a string or comment, so
//! callers always confirm with the locator.

use crate::error::{RefactorError, Result};
use crate::store::FileStore;
use aho_corasick::AhoCorasick;
use content_inspector::ContentType;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding the tool's own state. Never searched.
pub const STATE_DIR: &str = ".refactor";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// File extensions without the dot. Empty means every text file.
    pub extensions: Vec<String>,
    pub unrestricted_level: u8,
}

impl FileFilter {
    pub fn binary_as_text(&self) -> bool {
        self.unrestricted_level >= 3
    }

    fn extension_allowed(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}

/// Configure a `WalkBuilder` for the unrestricted level, ripgrep style:
/// - 0: respect all ignore files, skip hidden files
/// - 1 (-u): ignore .gitignore but respect other ignore files, skip hidden
/// - 2 (-uu): respect no ignore files, include hidden files
/// - 3 (-uuu): as 2, and binary files are searched as text
pub fn configure_walker(roots: &[PathBuf], unrestricted_level: u8) -> WalkBuilder {
    let mut builder = match roots.split_first() {
        None => WalkBuilder::new("."),
        Some((first, rest)) => {
            let mut b = WalkBuilder::new(first);
            for root in rest {
                b.add(root);
            }
            b
        },
    };

    match unrestricted_level {
        0 => {
            builder
                .git_ignore(true)
                .git_global(true)
                .git_exclude(true)
                .ignore(true)
                .parents(true)
                .hidden(true)
                .add_custom_ignore_filename(".gitignore")
                .add_custom_ignore_filename(".rgignore")
                .add_custom_ignore_filename(".refactorignore");
        },
        1 => {
            builder
                .git_ignore(false)
                .git_global(true)
                .git_exclude(true)
                .ignore(true)
                .parents(true)
                .hidden(true)
                .add_custom_ignore_filename(".rgignore")
                .add_custom_ignore_filename(".refactorignore");
        },
        _ => {
            builder
                .git_ignore(false)
                .git_global(false)
                .git_exclude(false)
                .ignore(false)
                .parents(false)
                .hidden(false);
        },
    }

    builder
}

pub fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let invalid = |e: globset::Error| RefactorError::invalid(format!("invalid glob: {}", e));

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).map_err(invalid)?);

        // A bare directory name also matches everything below it
        if pattern.ends_with('/')
            || (!pattern.contains('*') && !pattern.contains('?') && !pattern.contains('.'))
        {
            let recursive_pattern = if pattern.ends_with('/') {
                format!("{}**", pattern)
            } else {
                format!("{}/**", pattern)
            };
            builder.add(Glob::new(&recursive_pattern).map_err(invalid)?);
        }
    }
    Ok(Some(builder.build().map_err(invalid)?))
}

fn is_binary(content: &[u8]) -> bool {
    matches!(content_inspector::inspect(content), ContentType::BINARY)
}

fn in_state_dir(path: &Path) -> bool {
    path.components()
        .any(|component| component.as_os_str() == STATE_DIR)
}

/// Files under `roots` whose content contains any of `needles`, sorted.
///
/// A root that is itself a file is checked directly, bypassing the filter.
pub fn find_candidates(
    store: &dyn FileStore,
    roots: &[PathBuf],
    filter: &FileFilter,
    needles: &[&str],
) -> Result<Vec<PathBuf>> {
    let needles: Vec<&str> = needles.iter().copied().filter(|n| !n.is_empty()).collect();
    if needles.is_empty() {
        return Ok(Vec::new());
    }
    let matcher = AhoCorasick::new(&needles)
        .map_err(|e| RefactorError::invalid(format!("invalid search needle: {}", e)))?;

    let include_globs = build_globset(&filter.include)?;
    let exclude_globs = build_globset(&filter.exclude)?;

    let mut candidates = Vec::new();
    let mut consider = |path: &Path| {
        let Ok(content) = store.read(path) else {
            return;
        };
        if !filter.binary_as_text() && is_binary(&content) {
            return;
        }
        if matcher.is_match(&content) {
            candidates.push(path.to_path_buf());
        }
    };

    let (files, dirs): (Vec<&PathBuf>, Vec<&PathBuf>) = roots.iter().partition(|r| r.is_file());
    for file in files {
        consider(file);
    }

    if !dirs.is_empty() || roots.is_empty() {
        let dirs: Vec<PathBuf> = dirs.into_iter().cloned().collect();
        let walker = configure_walker(&dirs, filter.unrestricted_level).build();

        for entry in walker {
            let Ok(entry) = entry else {
                continue;
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let relative_path = dirs
                .iter()
                .find_map(|root| path.strip_prefix(root).ok())
                .unwrap_or(path);

            if in_state_dir(relative_path) || !filter.extension_allowed(path) {
                continue;
            }
            if let Some(ref includes) = include_globs {
                if !includes.is_match(relative_path) {
                    continue;
                }
            }
            if let Some(ref excludes) = exclude_globs {
                if excludes.is_match(relative_path) {
                    continue;
                }
            }

            consider(path);
        }
    }

    candidates.sort();
    candidates.dedup();

    if std::env::var("REFACTOR_DEBUG_SEARCH").is_ok() {
        eprintln!(
            "SEARCH: {} candidate files for {:?}",
            candidates.len(),
            needles
        );
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DiskStore, OverlayStore};
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("vendor")).unwrap();
        fs::write(root.join("src/a.rs"), "fn old_name() {}\n").unwrap();
        fs::write(root.join("src/b.py"), "old_name = 1\n").unwrap();
        fs::write(root.join("src/c.rs"), "fn other() {}\n").unwrap();
        fs::write(root.join("vendor/d.rs"), "old_name();\n").unwrap();
        temp_dir
    }

    fn relative(root: &Path, paths: Vec<PathBuf>) -> Vec<String> {
        paths
            .into_iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_finds_files_containing_needle() {
        let temp_dir = project();
        let root = temp_dir.path().to_path_buf();
        let found = find_candidates(&DiskStore, &[root.clone()], &FileFilter::default(), &["old_name"])
            .unwrap();
        assert_eq!(
            relative(&root, found),
            vec!["src/a.rs", "src/b.py", "vendor/d.rs"]
        );
    }

    #[test]
    fn test_extension_and_glob_filters() {
        let temp_dir = project();
        let root = temp_dir.path().to_path_buf();
        let filter = FileFilter {
            exclude: vec!["vendor".to_string()],
            extensions: vec!["rs".to_string()],
            ..FileFilter::default()
        };
        let found = find_candidates(&DiskStore, &[root.clone()], &filter, &["old_name"]).unwrap();
        assert_eq!(relative(&root, found), vec!["src/a.rs"]);

        let filter = FileFilter {
            include: vec!["src/**/*.py".to_string()],
            ..FileFilter::default()
        };
        let found = find_candidates(&DiskStore, &[root.clone()], &filter, &["old_name"]).unwrap();
        assert_eq!(relative(&root, found), vec!["src/b.py"]);
    }

    #[test]
    fn test_gitignore_respected_until_unrestricted() {
        let temp_dir = project();
        let root = temp_dir.path().to_path_buf();
        fs::write(root.join(".gitignore"), "vendor/\n").unwrap();

        let found = find_candidates(&DiskStore, &[root.clone()], &FileFilter::default(), &["old_name"])
            .unwrap();
        assert_eq!(relative(&root, found), vec!["src/a.rs", "src/b.py"]);

        let filter = FileFilter {
            unrestricted_level: 1,
            ..FileFilter::default()
        };
        let found = find_candidates(&DiskStore, &[root.clone()], &filter, &["old_name"]).unwrap();
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_state_dir_and_binary_files_skipped() {
        let temp_dir = project();
        let root = temp_dir.path().to_path_buf();
        fs::create_dir_all(root.join(".refactor/backups")).unwrap();
        fs::write(root.join(".refactor/backups/copy.rs"), "old_name\n").unwrap();
        fs::write(root.join("src/blob.bin"), b"old_name\x00\x01\x02\xff").unwrap();

        let filter = FileFilter {
            unrestricted_level: 2,
            ..FileFilter::default()
        };
        let found = find_candidates(&DiskStore, &[root.clone()], &filter, &["old_name"]).unwrap();
        assert_eq!(
            relative(&root, found),
            vec!["src/a.rs", "src/b.py", "vendor/d.rs"]
        );
    }

    #[test]
    fn test_sees_overlay_content() {
        let temp_dir = project();
        let root = temp_dir.path().to_path_buf();
        let mut overlay = OverlayStore::new();
        overlay
            .write(&root.join("src/c.rs"), b"fn old_name() {}\n")
            .unwrap();

        let found = find_candidates(&overlay, &[root.clone()], &FileFilter::default(), &["old_name"])
            .unwrap();
        assert!(found.contains(&root.join("src/c.rs")));
    }

    #[test]
    fn test_file_root_and_empty_needles() {
        let temp_dir = project();
        let file = temp_dir.path().join("src/a.rs");
        let found =
            find_candidates(&DiskStore, &[file.clone()], &FileFilter::default(), &["old_name"]).unwrap();
        assert_eq!(found, vec![file.clone()]);

        let found = find_candidates(&DiskStore, &[file], &FileFilter::default(), &[""]).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_build_globset_directory_pattern() {
        let globs = build_globset(&["node_modules".to_string()]).unwrap().unwrap();
        assert!(globs.is_match("node_modules/pkg/index.js"));
        assert!(!globs.is_match("src/index.js"));
        assert!(build_globset(&[]).unwrap().is_none());
        assert!(build_globset(&["[".to_string()]).is_err());
    }
}
