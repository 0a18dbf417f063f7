use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Staging/commit collaborator run after a successful batch.
pub trait VcsHook {
    /// Stage the changes and commit them. Returns a short description.
    fn commit(&self, message: &str, files: &[PathBuf]) -> Result<String>;
}

/// Commits with the `git` binary in a working tree.
#[derive(Debug, Clone)]
pub struct GitCommit {
    root: PathBuf,
}

impl GitCommit {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .current_dir(&self.root)
            .args(args)
            .output()
            .with_context(|| format!("Failed to run git {}", args.join(" ")))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("git {} failed: {}", args[0], error.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl VcsHook for GitCommit {
    fn commit(&self, message: &str, files: &[PathBuf]) -> Result<String> {
        if files.is_empty() {
            return Ok("nothing to commit".to_string());
        }

        self.git(&["rev-parse", "--is-inside-work-tree"])
            .context("Not in a git repository")?;

        let mut add = vec!["add", "--"];
        let paths: Vec<String> = files
            .iter()
            .map(|f| f.to_string_lossy().into_owned())
            .collect();
        add.extend(paths.iter().map(String::as_str));
        self.git(&add)?;

        self.git(&["commit", "-m", message])?;
        let head = self.git(&["rev-parse", "--short", "HEAD"])?;
        Ok(format!("committed {}", head))
    }
}
