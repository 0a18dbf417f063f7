//! Error types for the rename engine.
//!
//! Only conditions that stop a command before any mutation are errors here.
//! Unresolved names, per-file write failures and ambiguous dependencies are
//! reported as data on the result types instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefactorError {
    /// Bad arguments or a malformed mapping set.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A single-file scope named a file that does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The external AST query tool could not be run or failed.
    #[error("query tool failed for {}: {message}", path.display())]
    Query { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RefactorError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn query(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Query {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's input rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::FileNotFound(_))
    }
}

pub type Result<T, E = RefactorError> = std::result::Result<T, E>;
