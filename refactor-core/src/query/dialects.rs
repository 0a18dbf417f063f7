use crate::capture::{Capture, CaptureKind, SourceLocation};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// One textual output format of an AST query tool.
///
/// Implementations parse a single line and return `None` for anything they do
/// not recognise. Rows and columns in tool output are 0-based; captures carry
/// 1-based lines and 0-based columns.
pub trait CaptureDialect: Sync {
    fn name(&self) -> &'static str;
    fn parse_line(&self, line: &str, file: &Path) -> Option<Capture>;
}

/// `<kind> <start_row> <start_col> <end_row> <end_col> <text>`
pub struct PositionalDialect;

/// `@<kind> (<row>, <col>)[-(<row>, <col>)] <text>`
pub struct AtCaptureDialect;

/// `capture: [<n> - ]<kind>, text: "<text>", row: <r>, col: <c>` and the
/// `start: (<r>, <c>)` variant printed by `tree-sitter query`.
pub struct KeyValueDialect;

static POSITIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_@][\w.\-]*)\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s+(.+?)\s*$").unwrap()
});

static AT_CAPTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*@([\w.\-]+)\s*:?\s*\(\s*(\d+)\s*,\s*(\d+)\s*\)(?:\s*-\s*\(\s*\d+\s*,\s*\d+\s*\))?\s*:?\s*(.+?)\s*$",
    )
    .unwrap()
});

static KV_CAPTURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"capture:\s*(?:\d+\s*-\s*)?@?([\w.\-]+)").unwrap());
static KV_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"text:\s*(?:"((?:[^"\\]|\\.)*)"|`([^`]*)`|'([^']*)')"#).unwrap());
static KV_ROW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\brow:\s*(\d+)").unwrap());
static KV_COL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:col|column):\s*(\d+)").unwrap());
static KV_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"start:\s*\(\s*(\d+)\s*,\s*(\d+)\s*\)").unwrap());

fn build_capture(kind: &str, row: &str, col: &str, text: &str, file: &Path) -> Option<Capture> {
    let kind = CaptureKind::from_capture_name(kind)?;
    let row: usize = row.parse().ok()?;
    let column: usize = col.parse().ok()?;
    let text = unquote(text);
    if text.is_empty() {
        return None;
    }

    Some(Capture::new(
        kind,
        SourceLocation::new(file, row + 1, column),
        text,
    ))
}

/// Strip one layer of matching backticks or double quotes.
fn unquote(text: &str) -> String {
    let text = text.trim();
    for quote in ['`', '"'] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return text[1..text.len() - 1].to_string();
        }
    }
    text.to_string()
}

impl CaptureDialect for PositionalDialect {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn parse_line(&self, line: &str, file: &Path) -> Option<Capture> {
        let caps = POSITIONAL.captures(line)?;
        build_capture(&caps[1], &caps[2], &caps[3], &caps[6], file)
    }
}

impl CaptureDialect for AtCaptureDialect {
    fn name(&self) -> &'static str {
        "at-capture"
    }

    fn parse_line(&self, line: &str, file: &Path) -> Option<Capture> {
        let caps = AT_CAPTURE.captures(line)?;
        build_capture(&caps[1], &caps[2], &caps[3], &caps[4], file)
    }
}

impl CaptureDialect for KeyValueDialect {
    fn name(&self) -> &'static str {
        "key-value"
    }

    fn parse_line(&self, line: &str, file: &Path) -> Option<Capture> {
        let kind = KV_CAPTURE.captures(line)?;
        let text = KV_TEXT.captures(line)?;
        let text = text
            .get(1)
            .or_else(|| text.get(2))
            .or_else(|| text.get(3))?
            .as_str()
            .replace("\\\"", "\"");

        let (row, col) = if let Some(start) = KV_START.captures(line) {
            (start[1].to_string(), start[2].to_string())
        } else {
            (
                KV_ROW.captures(line)?[1].to_string(),
                KV_COL.captures(line)?[1].to_string(),
            )
        };

        build_capture(&kind[1], &row, &col, &text, file)
    }
}

/// Dialects in tie-break order.
pub static DIALECTS: [&dyn CaptureDialect; 3] =
    [&PositionalDialect, &AtCaptureDialect, &KeyValueDialect];
