use crate::error::RefactorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Kind of a span reported by an AST query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureKind {
    Definition,
    Reference,
    TypeReference,
    Import,
    Export,
    Parameter,
    StringLiteral,
    Comment,
}

impl CaptureKind {
    pub const ALL: [Self; 8] = [
        Self::Definition,
        Self::Reference,
        Self::TypeReference,
        Self::Import,
        Self::Export,
        Self::Parameter,
        Self::StringLiteral,
        Self::Comment,
    ];

    /// String literals and comments are never renamed.
    pub fn is_excluded(self) -> bool {
        matches!(self, Self::StringLiteral | Self::Comment)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::Reference => "reference",
            Self::TypeReference => "type_reference",
            Self::Import => "import",
            Self::Export => "export",
            Self::Parameter => "parameter",
            Self::StringLiteral => "string_literal",
            Self::Comment => "comment",
        }
    }

    /// Map a query capture name such as `name.definition.function` or
    /// `reference.call` onto a kind.
    ///
    /// Components are checked from the most to the least specific meaning so
    /// that `definition.string` is still a string and `reference.type` is a
    /// type reference.
    pub fn from_capture_name(name: &str) -> Option<Self> {
        let name = name.trim().trim_start_matches('@').to_ascii_lowercase();
        let parts: Vec<&str> = name
            .split(|c: char| c == '.' || c == '-' || c == '_')
            .filter(|p| !p.is_empty())
            .collect();

        let has = |candidates: &[&str]| parts.iter().any(|p| candidates.contains(p));

        if has(&["comment", "doc"]) {
            Some(Self::Comment)
        } else if has(&["string", "str", "literal", "template"]) {
            Some(Self::StringLiteral)
        } else if has(&["import", "use", "include", "require"]) {
            Some(Self::Import)
        } else if has(&["export", "exported"]) {
            Some(Self::Export)
        } else if has(&["parameter", "param", "argument", "arg"]) {
            Some(Self::Parameter)
        } else if has(&["definition", "def", "declaration", "decl"]) {
            Some(Self::Definition)
        } else if has(&["type", "typeref"]) {
            Some(Self::TypeReference)
        } else if has(&["reference", "ref", "call", "identifier", "ident", "usage"]) {
            Some(Self::Reference)
        } else {
            None
        }
    }
}

impl fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A position in a source file: 1-based line, 0-based byte column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    pub kind: CaptureKind,
    pub location: SourceLocation,
    pub text: String,
}

impl Capture {
    pub fn new(kind: CaptureKind, location: SourceLocation, text: impl Into<String>) -> Self {
        Self {
            kind,
            location,
            text: text.into(),
        }
    }
}

/// Inclusive range of 1-based line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Result<Self, RefactorError> {
        if start == 0 || end < start {
            return Err(RefactorError::invalid(format!(
                "line range {}:{} must satisfy 1 <= start <= end",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, line: usize) -> bool {
        (self.start..=self.end).contains(&line)
    }
}

impl FromStr for LineRange {
    type Err = RefactorError;

    /// Accepts `10:20`, `10-20` or a single line `15`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| RefactorError::invalid(format!("invalid line range '{}'", s)))
        };

        match s.split_once([':', '-']) {
            Some((start, end)) => Self::new(parse(start)?, parse(end)?),
            None => {
                let line = parse(s)?;
                Self::new(line, line)
            },
        }
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Identifier bytes for word-boundary purposes. `$` is included for
/// JavaScript and shell identifiers.
pub fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

/// Whether `name` is a syntactically valid identifier to rename to or from.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' || first == b'$' => {},
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
}
