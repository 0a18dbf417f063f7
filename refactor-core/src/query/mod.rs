//! AST query adapter.
//!
//! Turns the raw textual output of an external AST query tool into typed
//! [`Capture`] records. The tool's output format has drifted over time, so
//! several dialects are supported and the one that parses the most lines of a
//! given output is used. Lines that do not parse are skipped.

mod command;
mod dialects;
mod lexical;

pub use command::QueryCommand;
pub use dialects::{AtCaptureDialect, CaptureDialect, KeyValueDialect, PositionalDialect, DIALECTS};
pub use lexical::{Language, LexicalSource};

use crate::capture::Capture;
use crate::error::Result;
use std::path::Path;

/// Produces captures for one file and one target identifier.
///
/// `content` is the file content the captures must describe. It can differ
/// from what is on disk during a dry run.
pub trait CaptureSource {
    fn captures(&self, path: &Path, content: &str, name: &str) -> Result<Vec<Capture>>;
}

impl<T: CaptureSource + ?Sized> CaptureSource for Box<T> {
    fn captures(&self, path: &Path, content: &str, name: &str) -> Result<Vec<Capture>> {
        (**self).captures(path, content, name)
    }
}

/// Pick the dialect that recognises the most lines of `output`.
pub fn detect_dialect(output: &str, file: &Path) -> Option<&'static dyn CaptureDialect> {
    let mut best: Option<(&'static dyn CaptureDialect, usize)> = None;

    for dialect in DIALECTS {
        let parsed = output
            .lines()
            .filter(|line| dialect.parse_line(line, file).is_some())
            .count();

        if std::env::var("REFACTOR_DEBUG_QUERY").is_ok() {
            eprintln!("QUERY: dialect {} parsed {} lines", dialect.name(), parsed);
        }

        if parsed > 0 && best.map_or(true, |(_, count)| parsed > count) {
            best = Some((dialect, parsed));
        }
    }

    best.map(|(dialect, _)| dialect)
}

/// Parse query tool output for `file` into captures in source order.
pub fn parse_captures(output: &str, file: &Path) -> Vec<Capture> {
    let Some(dialect) = detect_dialect(output, file) else {
        return Vec::new();
    };

    let mut captures: Vec<Capture> = output
        .lines()
        .filter_map(|line| dialect.parse_line(line, file))
        .collect();

    // Tools emit captures grouped by pattern, not by position
    captures.sort_by_key(|c| (c.location.line, c.location.column));
    captures
}
