use super::{parse_captures, CaptureSource};
use crate::capture::Capture;
use crate::error::{RefactorError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs an external AST query tool and adapts its output.
///
/// The argv template may contain `{file}`, `{name}` and `{query}`
/// placeholders. The tool is always pointed at a temporary copy of the
/// content being queried, so pending dry-run edits are visible to it.
#[derive(Debug, Clone)]
pub struct QueryCommand {
    argv: Vec<String>,
    query_file: Option<PathBuf>,
}

impl QueryCommand {
    pub fn new(argv: Vec<String>, query_file: Option<PathBuf>) -> Result<Self> {
        if argv.first().map_or(true, |program| program.trim().is_empty()) {
            return Err(RefactorError::invalid("query command must not be empty"));
        }
        if query_file.is_none() && argv.iter().any(|a| a.contains("{query}")) {
            return Err(RefactorError::invalid(
                "query command uses {query} but no query file is configured",
            ));
        }
        Ok(Self { argv, query_file })
    }

    /// Build from a whitespace separated command line.
    pub fn parse(command_line: &str, query_file: Option<PathBuf>) -> Result<Self> {
        Self::new(
            command_line
                .split_whitespace()
                .map(ToString::to_string)
                .collect(),
            query_file,
        )
    }

    fn expand(&self, arg: &str, file: &Path, name: &str) -> String {
        let mut expanded = arg
            .replace("{file}", &file.to_string_lossy())
            .replace("{name}", name);
        if let Some(query) = &self.query_file {
            expanded = expanded.replace("{query}", &query.to_string_lossy());
        }
        expanded
    }

    fn run(&self, file: &Path, name: &str) -> Result<String> {
        let args: Vec<String> = self.argv[1..]
            .iter()
            .map(|arg| self.expand(arg, file, name))
            .collect();

        let output = Command::new(&self.argv[0])
            .args(&args)
            .output()
            .map_err(|e| RefactorError::query(file, format!("failed to run {}: {}", self.argv[0], e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RefactorError::query(
                file,
                format!("{} exited with {}: {}", self.argv[0], output.status, stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl CaptureSource for QueryCommand {
    fn captures(&self, path: &Path, content: &str, name: &str) -> Result<Vec<Capture>> {
        // Keep the extension so the tool picks the right grammar
        let suffix = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut temp = tempfile::Builder::new()
            .prefix(".refactor-query-")
            .suffix(&suffix)
            .tempfile()?;
        temp.write_all(content.as_bytes())?;
        temp.flush()?;

        let stdout = self.run(temp.path(), name)?;
        Ok(parse_captures(&stdout, path))
    }
}
