use crate::capture::{Capture, CaptureKind, LineRange, SourceLocation};
use crate::error::Result;
use crate::query::CaptureSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A renamable use of the target identifier.
///
/// Built only from captures whose kind is not excluded, so an occurrence can
/// never be a string literal or a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub kind: CaptureKind,
    pub location: SourceLocation,
    pub text: String,
}

impl Occurrence {
    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn column(&self) -> usize {
        self.location.column
    }
}

/// When several captures fire on one location the most specific kind wins.
fn specificity(kind: CaptureKind) -> u8 {
    match kind {
        CaptureKind::Definition => 6,
        CaptureKind::Import => 5,
        CaptureKind::Export => 4,
        CaptureKind::Parameter => 3,
        CaptureKind::TypeReference => 2,
        CaptureKind::Reference => 1,
        CaptureKind::StringLiteral | CaptureKind::Comment => 0,
    }
}

/// Reduce raw captures to occurrences of `name`.
///
/// Keeps exact text matches, drops every location that any excluded capture
/// claims, collapses duplicate captures of the same location and applies the
/// optional line range. Output is in source order.
pub fn select_occurrences(
    captures: Vec<Capture>,
    name: &str,
    range: Option<LineRange>,
) -> Vec<Occurrence> {
    let mut by_location: BTreeMap<(usize, usize), Capture> = BTreeMap::new();
    let mut excluded = Vec::new();

    for capture in captures {
        if capture.text != name {
            continue;
        }
        if range.is_some_and(|r| !r.contains(capture.location.line)) {
            continue;
        }

        let key = (capture.location.line, capture.location.column);
        if capture.kind.is_excluded() {
            excluded.push(key);
            continue;
        }

        match by_location.get(&key) {
            Some(existing) if specificity(existing.kind) >= specificity(capture.kind) => {},
            _ => {
                by_location.insert(key, capture);
            },
        }
    }

    for key in excluded {
        by_location.remove(&key);
    }

    by_location
        .into_values()
        .map(|capture| Occurrence {
            kind: capture.kind,
            location: capture.location,
            text: capture.text,
        })
        .collect()
}

/// Find the occurrences of `name` in one file's `content`.
pub fn find_occurrences(
    source: &dyn CaptureSource,
    path: &Path,
    content: &str,
    name: &str,
    range: Option<LineRange>,
) -> Result<Vec<Occurrence>> {
    if !content.contains(name) {
        return Ok(Vec::new());
    }
    let captures = source.captures(path, content, name)?;
    Ok(select_occurrences(captures, name, range))
}
