use super::CaptureSource;
use crate::capture::{is_identifier_byte, Capture, CaptureKind, SourceLocation};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Language families the built-in lexer knows the comment and string syntax of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Rust,
    JavaScript,
    Go,
    CFamily,
    Python,
    Ruby,
    Shell,
    Lua,
    Generic,
}

struct Quote {
    delim: &'static str,
    multiline: bool,
    escapes: bool,
    /// Opens embedded code inside the literal.
    interpolation: Option<&'static str>,
}

struct Syntax {
    line_comments: &'static [&'static str],
    block_comments: &'static [(&'static str, &'static str)],
    quotes: &'static [Quote],
    /// `'` opens a char literal only when it looks like one (Rust lifetimes).
    char_literals: bool,
    /// `r"..."`, `r#"..."#`, `br"..."` and `cr"..."`.
    raw_strings: bool,
    /// `f"..."` and `rf"..."` interpolate `{...}`.
    format_strings: bool,
}

const DOUBLE: Quote = Quote {
    delim: "\"",
    multiline: false,
    escapes: true,
    interpolation: None,
};
const SINGLE: Quote = Quote {
    delim: "'",
    multiline: false,
    escapes: true,
    interpolation: None,
};
const TEMPLATE: Quote = Quote {
    delim: "`",
    multiline: true,
    escapes: true,
    interpolation: Some("${"),
};
const RAW_BACKTICK: Quote = Quote {
    delim: "`",
    multiline: true,
    escapes: false,
    interpolation: None,
};
const TRIPLE_DOUBLE: Quote = Quote {
    delim: "\"\"\"",
    multiline: true,
    escapes: true,
    interpolation: None,
};
const TRIPLE_SINGLE: Quote = Quote {
    delim: "'''",
    multiline: true,
    escapes: true,
    interpolation: None,
};
const RUST_STRING: Quote = Quote {
    delim: "\"",
    multiline: true,
    escapes: true,
    interpolation: None,
};

const C_BLOCK: &[(&str, &str)] = &[("/*", "*/")];

impl Language {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match ext.as_str() {
            "rs" => Self::Rust,
            "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" | "mts" | "cts" => Self::JavaScript,
            "go" => Self::Go,
            "c" | "h" | "cc" | "cpp" | "cxx" | "hpp" | "hh" | "java" | "cs" | "kt" | "kts"
            | "swift" | "scala" | "dart" | "php" => Self::CFamily,
            "py" | "pyi" => Self::Python,
            "rb" | "rake" => Self::Ruby,
            "sh" | "bash" | "zsh" => Self::Shell,
            "lua" | "sql" => Self::Lua,
            _ => Self::Generic,
        }
    }

    fn syntax(self) -> Syntax {
        match self {
            Self::Rust => Syntax {
                line_comments: &["//"],
                block_comments: C_BLOCK,
                quotes: &[RUST_STRING],
                char_literals: true,
                raw_strings: true,
                format_strings: false,
            },
            Self::JavaScript => Syntax {
                line_comments: &["//"],
                block_comments: C_BLOCK,
                quotes: &[TEMPLATE, DOUBLE, SINGLE],
                char_literals: false,
                raw_strings: false,
                format_strings: false,
            },
            Self::Go => Syntax {
                line_comments: &["//"],
                block_comments: C_BLOCK,
                quotes: &[RAW_BACKTICK, DOUBLE, SINGLE],
                char_literals: false,
                raw_strings: false,
                format_strings: false,
            },
            Self::CFamily => Syntax {
                line_comments: &["//"],
                block_comments: C_BLOCK,
                quotes: &[TRIPLE_DOUBLE, DOUBLE, SINGLE],
                char_literals: false,
                raw_strings: false,
                format_strings: false,
            },
            Self::Python => Syntax {
                line_comments: &["#"],
                block_comments: &[],
                quotes: &[TRIPLE_DOUBLE, TRIPLE_SINGLE, DOUBLE, SINGLE],
                char_literals: false,
                raw_strings: false,
                format_strings: true,
            },
            Self::Ruby => Syntax {
                line_comments: &["#"],
                block_comments: &[("=begin", "=end")],
                quotes: &[DOUBLE, SINGLE],
                char_literals: false,
                raw_strings: false,
                format_strings: false,
            },
            Self::Shell => Syntax {
                line_comments: &["#"],
                block_comments: &[],
                quotes: &[DOUBLE, SINGLE],
                char_literals: false,
                raw_strings: false,
                format_strings: false,
            },
            Self::Lua => Syntax {
                line_comments: &["--"],
                block_comments: &[("--[[", "]]")],
                quotes: &[DOUBLE, SINGLE],
                char_literals: false,
                raw_strings: false,
                format_strings: false,
            },
            Self::Generic => Syntax {
                line_comments: &["//", "#"],
                block_comments: C_BLOCK,
                quotes: &[DOUBLE, SINGLE],
                char_literals: false,
                raw_strings: false,
                format_strings: false,
            },
        }
    }
}

const DEFINITION_KEYWORDS: &[&str] = &[
    "fn",
    "def",
    "function",
    "func",
    "class",
    "struct",
    "enum",
    "trait",
    "type",
    "interface",
    "let",
    "const",
    "var",
    "val",
    "static",
    "mod",
    "module",
    "union",
    "macro",
    "local",
];

/// Keywords whose next `(` opens a parameter list.
const SIGNATURE_KEYWORDS: &[&str] = &["fn", "def", "function", "func"];

const IMPORT_KEYWORDS: &[&str] = &["use", "import", "from", "require", "include", "extern"];

const TYPE_KEYWORDS: &[&str] = &["impl", "extends", "implements", "new", "as", "instanceof", "dyn"];

/// Keywords that may sit between `(`/`,` and a parameter name.
const PARAMETER_MODIFIERS: &[&str] = &["mut", "ref", "final", "const", "readonly", "in", "out"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Punct(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Statement {
    Import,
    Export,
}

#[derive(Clone, Copy)]
enum Mode {
    Code,
    LineComment,
    BlockComment(&'static str),
    Str {
        close: &'static str,
        multiline: bool,
        escapes: bool,
        interpolation: Option<&'static str>,
    },
    /// Closed by `"` and this many `#`, no escapes.
    RawStr { hashes: usize },
}

struct Lexer<'a> {
    content: &'a str,
    bytes: &'a [u8],
    syntax: Syntax,
    path: PathBuf,
    name: &'a str,
    line: usize,
    line_start: usize,
    mode: Mode,
    escape_next: bool,
    /// Last two code tokens, most recent first.
    recent: [Option<Token>; 2],
    at_line_start: bool,
    statement: Option<(Statement, usize)>,
    paren_depth: usize,
    brace_depth: usize,
    signature_pending: bool,
    params_depth: Option<usize>,
    /// Literal to resume and the brace depth outside each open interpolation.
    interpolations: Vec<(Mode, usize)>,
    captures: Vec<Capture>,
}

impl<'a> Lexer<'a> {
    fn new(path: &Path, content: &'a str, name: &'a str) -> Self {
        Self {
            content,
            bytes: content.as_bytes(),
            syntax: Language::from_path(path).syntax(),
            path: path.to_path_buf(),
            name,
            line: 1,
            line_start: 0,
            mode: Mode::Code,
            escape_next: false,
            recent: [None, None],
            at_line_start: true,
            statement: None,
            paren_depth: 0,
            brace_depth: 0,
            signature_pending: false,
            params_depth: None,
            interpolations: Vec::new(),
            captures: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Capture> {
        let mut i = 0;
        while i < self.bytes.len() {
            if self.bytes[i] == b'\n' {
                self.newline(i);
                i += 1;
                continue;
            }

            i = match self.mode {
                Mode::Code => self.code_step(i),
                Mode::LineComment => self.region_step(i, CaptureKind::Comment),
                Mode::BlockComment(end) => {
                    if self.starts_with(i, end) {
                        self.mode = Mode::Code;
                        i + end.len()
                    } else {
                        self.region_step(i, CaptureKind::Comment)
                    }
                },
                Mode::Str {
                    close,
                    escapes,
                    interpolation,
                    ..
                } => {
                    if self.escape_next {
                        self.escape_next = false;
                        i + 1
                    } else if escapes && self.bytes[i] == b'\\' {
                        self.escape_next = true;
                        i + 1
                    } else if interpolation == Some("{") && self.starts_with(i, "{{") {
                        i + 2
                    } else if let Some(open) = interpolation.filter(|open| self.starts_with(i, open)) {
                        self.interpolations.push((self.mode, self.brace_depth));
                        self.mode = Mode::Code;
                        self.handle_punct(b'{');
                        i + open.len()
                    } else if self.starts_with(i, close) {
                        self.mode = Mode::Code;
                        self.push_token(Token::Punct(b'"'));
                        i + close.len()
                    } else {
                        self.string_step(i, interpolation)
                    }
                },
                Mode::RawStr { hashes } => {
                    if self.closes_raw_string(i, hashes) {
                        self.mode = Mode::Code;
                        self.push_token(Token::Punct(b'"'));
                        i + 1 + hashes
                    } else {
                        self.region_step(i, CaptureKind::StringLiteral)
                    }
                },
            };
        }
        self.captures
    }

    fn newline(&mut self, i: usize) {
        self.line += 1;
        self.line_start = i + 1;
        self.escape_next = false;

        match self.mode {
            Mode::LineComment
            | Mode::Str {
                multiline: false, ..
            } => self.mode = Mode::Code,
            _ => {},
        }

        if let Some((_, depth)) = self.statement {
            if self.brace_depth <= depth && self.paren_depth == 0 {
                self.statement = None;
            }
        }
        self.at_line_start = true;
    }

    fn starts_with(&self, i: usize, s: &str) -> bool {
        self.bytes[i..].starts_with(s.as_bytes())
    }

    fn word_end(&self, start: usize) -> usize {
        let mut end = start;
        while end < self.bytes.len() && is_identifier_byte(self.bytes[end]) {
            end += 1;
        }
        end
    }

    fn is_word_start(&self, i: usize) -> bool {
        is_identifier_byte(self.bytes[i]) && (i == 0 || !is_identifier_byte(self.bytes[i - 1]))
    }

    fn emit(&mut self, kind: CaptureKind, start: usize) {
        self.captures.push(Capture::new(
            kind,
            SourceLocation::new(&self.path, self.line, start - self.line_start),
            self.name,
        ));
    }

    fn string_step(&mut self, i: usize, interpolation: Option<&str>) -> usize {
        if !self.is_word_start(i) {
            return i + 1;
        }
        let mut end = self.word_end(i);
        // In `a${b}` the `$` opens the interpolation
        if interpolation == Some("${") && self.bytes[end - 1] == b'$' && self.starts_with(end, "{") {
            end -= 1;
        }
        if &self.content[i..end] == self.name {
            self.emit(CaptureKind::StringLiteral, i);
        }
        end.max(i + 1)
    }

    fn closes_raw_string(&self, i: usize, hashes: usize) -> bool {
        self.bytes[i] == b'"'
            && self.bytes[i + 1..].iter().take(hashes).filter(|&&b| b == b'#').count() == hashes
    }

    /// Length of a raw string opener (`r#"`) starting at `i`, with its `#` count.
    fn raw_string_open(&self, i: usize) -> Option<(usize, usize)> {
        let end = self.word_end(i);
        if !matches!(&self.content[i..end], "r" | "br" | "cr") {
            return None;
        }
        let hashes = self.bytes[end..].iter().take_while(|&&b| b == b'#').count();
        (self.bytes.get(end + hashes) == Some(&b'"')).then_some((end + hashes + 1 - i, hashes))
    }

    /// `f"`, `rf"` and `fr"` prefixes right before the quote at `i`.
    fn has_format_prefix(&self, i: usize) -> bool {
        let start = self.bytes[..i]
            .iter()
            .rposition(|&b| !b.is_ascii_alphabetic())
            .map_or(0, |p| p + 1);
        let word_start = start == 0 || !is_identifier_byte(self.bytes[start - 1]);
        word_start && matches!(self.content[start..i].to_ascii_lowercase().as_str(), "f" | "rf" | "fr")
    }

    /// A `}` that ends the innermost interpolation rather than a code block.
    fn closes_interpolation(&self) -> bool {
        self.interpolations
            .last()
            .is_some_and(|&(_, depth)| self.brace_depth == depth + 1)
    }

    fn region_step(&mut self, i: usize, kind: CaptureKind) -> usize {
        if !self.is_word_start(i) {
            return i + 1;
        }
        let end = self.word_end(i);
        if &self.content[i..end] == self.name {
            self.emit(kind, i);
        }
        end
    }

    fn push_token(&mut self, token: Token) {
        self.recent[1] = self.recent[0].take();
        self.recent[0] = Some(token);
    }

    fn code_step(&mut self, i: usize) -> usize {
        let b = self.bytes[i];

        for &prefix in self.syntax.line_comments {
            if self.starts_with(i, prefix) {
                // `$#` and `foo#bar` are not comments in shell-like languages
                if prefix == "#" && i > 0 && !self.bytes[i - 1].is_ascii_whitespace() {
                    continue;
                }
                // `--[[` opens a block comment in Lua
                if self
                    .syntax
                    .block_comments
                    .iter()
                    .any(|(open, _)| open.starts_with(prefix) && self.starts_with(i, open))
                {
                    continue;
                }
                self.mode = Mode::LineComment;
                return i + prefix.len();
            }
        }

        for &(open, close) in self.syntax.block_comments {
            if self.starts_with(i, open) {
                self.mode = Mode::BlockComment(close);
                return i + open.len();
            }
        }

        if b == b'\'' && self.syntax.char_literals {
            if self.is_char_literal(i) {
                self.mode = Mode::Str {
                    close: "'",
                    multiline: false,
                    escapes: true,
                    interpolation: None,
                };
                return i + 1;
            }
            self.push_token(Token::Punct(b));
            return i + 1;
        }

        if b == b'}' && self.closes_interpolation() {
            if let Some((mode, depth)) = self.interpolations.pop() {
                self.mode = mode;
                self.brace_depth = depth;
            }
            return i + 1;
        }

        if self.syntax.raw_strings && self.is_word_start(i) {
            if let Some((len, hashes)) = self.raw_string_open(i) {
                self.mode = Mode::RawStr { hashes };
                self.at_line_start = false;
                return i + len;
            }
        }

        for quote in self.syntax.quotes {
            if self.starts_with(i, quote.delim) {
                let interpolation = if self.syntax.format_strings && self.has_format_prefix(i) {
                    Some("{")
                } else {
                    quote.interpolation
                };
                self.mode = Mode::Str {
                    close: quote.delim,
                    multiline: quote.multiline,
                    escapes: quote.escapes,
                    interpolation,
                };
                self.at_line_start = false;
                return i + quote.delim.len();
            }
        }

        if self.is_word_start(i) {
            let end = self.word_end(i);
            self.handle_word(i, end);
            return end;
        }

        if !b.is_ascii_whitespace() {
            self.handle_punct(b);
        }
        i + 1
    }

    fn is_char_literal(&self, i: usize) -> bool {
        match self.bytes.get(i + 1) {
            Some(b'\\') => true,
            Some(_) => self.content[i + 1..]
                .chars()
                .next()
                .map(|c| i + 1 + c.len_utf8())
                .is_some_and(|close| self.bytes.get(close) == Some(&b'\'')),
            None => false,
        }
    }

    fn handle_punct(&mut self, b: u8) {
        match b {
            b'(' => {
                self.paren_depth += 1;
                if self.signature_pending {
                    self.params_depth = Some(self.paren_depth);
                    self.signature_pending = false;
                }
            },
            b')' => {
                if self.params_depth == Some(self.paren_depth) {
                    self.params_depth = None;
                }
                self.paren_depth = self.paren_depth.saturating_sub(1);
            },
            b'{' => {
                self.brace_depth += 1;
                self.signature_pending = false;
            },
            b'}' => self.brace_depth = self.brace_depth.saturating_sub(1),
            b';' => {
                self.signature_pending = false;
                self.statement = None;
            },
            _ => {},
        }

        // `#include` and `#[derive]` keep the line start for keyword detection
        if b != b'#' {
            self.at_line_start = false;
        }
        self.push_token(Token::Punct(b));
    }

    fn handle_word(&mut self, start: usize, end: usize) {
        let content = self.content;
        let word = &content[start..end];

        if word == self.name {
            let kind = self.classify(start);
            self.emit(kind, start);
        }

        if self.at_line_start && self.statement.is_none() {
            if IMPORT_KEYWORDS.contains(&word) {
                self.statement = Some((Statement::Import, self.brace_depth));
            } else if word == "export" {
                self.statement = Some((Statement::Export, self.brace_depth));
            }
        }

        if SIGNATURE_KEYWORDS.contains(&word) {
            self.signature_pending = true;
        }

        // Visibility modifiers do not end the line start (`pub use`, `pub fn`)
        if !matches!(word, "pub" | "export" | "async" | "unsafe" | "default") {
            self.at_line_start = false;
        }
        self.push_token(Token::Word(word.to_string()));
    }

    fn previous_word(&self, index: usize) -> Option<&str> {
        match &self.recent[index] {
            Some(Token::Word(w)) => Some(w.as_str()),
            _ => None,
        }
    }

    fn previous_punct(&self) -> Option<u8> {
        match self.recent[0] {
            Some(Token::Punct(p)) => Some(p),
            _ => None,
        }
    }

    fn classify(&self, start: usize) -> CaptureKind {
        let prev = self.previous_word(0);
        let before_prev = self.previous_word(1);

        let after_keyword = |w: Option<&str>| w.is_some_and(|w| DEFINITION_KEYWORDS.contains(&w));
        if after_keyword(prev) || (prev == Some("mut") && after_keyword(before_prev)) {
            return CaptureKind::Definition;
        }

        match self.statement {
            Some((Statement::Import, _)) => return CaptureKind::Import,
            Some((Statement::Export, _)) => return CaptureKind::Export,
            None => {},
        }

        if self.params_depth == Some(self.paren_depth) {
            let opens_param = matches!(self.previous_punct(), Some(b'(' | b','))
                || prev.is_some_and(|w| PARAMETER_MODIFIERS.contains(&w));
            if opens_param {
                return CaptureKind::Parameter;
            }
        }

        if prev.is_some_and(|w| TYPE_KEYWORDS.contains(&w)) {
            return CaptureKind::TypeReference;
        }

        match self.previous_punct() {
            // `x: Type` but not `path::item`
            Some(b':') if start < 2 || self.preceding_non_space(start, 2) != Some(b':') => {
                CaptureKind::TypeReference
            },
            // `-> Type`
            Some(b'>') if self.preceding_non_space(start, 2) == Some(b'-') => {
                CaptureKind::TypeReference
            },
            _ => CaptureKind::Reference,
        }
    }

    /// The `nth` non-whitespace byte before `start` (1 = immediately preceding).
    fn preceding_non_space(&self, start: usize, nth: usize) -> Option<u8> {
        self.bytes[..start]
            .iter()
            .rev()
            .filter(|b| !b.is_ascii_whitespace())
            .nth(nth - 1)
            .copied()
    }
}

/// Built-in capture source used when no external query tool is configured.
///
/// It is a lexer rather than a parser: comment and string regions are exact
/// for the supported languages, while the code roles are keyword heuristics.
/// Roles are informational only, so the heuristics never affect what gets
/// renamed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalSource;

impl CaptureSource for LexicalSource {
    fn captures(&self, path: &Path, content: &str, name: &str) -> Result<Vec<Capture>> {
        if name.is_empty() || !content.contains(name) {
            return Ok(Vec::new());
        }
        Ok(Lexer::new(path, content, name).run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(file: &str, content: &str, name: &str) -> Vec<(usize, usize, CaptureKind)> {
        LexicalSource
            .captures(Path::new(file), content, name)
            .unwrap()
            .into_iter()
            .map(|c| (c.location.line, c.location.column, c.kind))
            .collect()
    }

    #[test]
    fn test_rust_roles() {
        let content = "\
use crate::user::User;
// User is documented here
fn load(user: User) -> User {
    let msg = \"User\";
    User::new()
}
";
        assert_eq!(
            kinds("src/lib.rs", content, "User"),
            vec![
                (1, 17, CaptureKind::Import),
                (2, 3, CaptureKind::Comment),
                (3, 14, CaptureKind::TypeReference),
                (3, 23, CaptureKind::TypeReference),
                (4, 15, CaptureKind::StringLiteral),
                (5, 4, CaptureKind::Reference),
            ]
        );
    }

    #[test]
    fn test_rust_definitions_and_parameters() {
        let content = "struct Point;\nfn scale(mut factor: f64, other: f64) {}\nlet mut factor = 2;\n";
        assert_eq!(
            kinds("a.rs", content, "Point"),
            vec![(1, 7, CaptureKind::Definition)]
        );
        assert_eq!(
            kinds("a.rs", content, "factor"),
            vec![
                (2, 13, CaptureKind::Parameter),
                (3, 8, CaptureKind::Definition),
            ]
        );
        assert_eq!(
            kinds("a.rs", content, "other"),
            vec![(2, 26, CaptureKind::Parameter)]
        );
    }

    #[test]
    fn test_rust_lifetimes_are_not_strings() {
        let content = "fn get<'a>(value: &'a str) -> &'a str { value }\nlet c = 'x';\n";
        let found = kinds("a.rs", content, "value");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].2, CaptureKind::Parameter);
        assert_eq!(found[1].2, CaptureKind::Reference);
    }

    #[test]
    fn test_block_comments_span_lines() {
        let content = "/* total\n   total */\nlet total = 1;\n";
        assert_eq!(
            kinds("a.js", content, "total"),
            vec![
                (1, 3, CaptureKind::Comment),
                (2, 3, CaptureKind::Comment),
                (3, 4, CaptureKind::Definition),
            ]
        );
    }

    #[test]
    fn test_javascript_imports_exports_and_templates() {
        let content = "\
import { render } from './render';
export { render };
const out = `render ${x}`;
render();
";
        assert_eq!(
            kinds("app.ts", content, "render"),
            vec![
                (1, 9, CaptureKind::Import),
                (1, 26, CaptureKind::StringLiteral),
                (2, 9, CaptureKind::Export),
                (3, 13, CaptureKind::StringLiteral),
                (4, 0, CaptureKind::Reference),
            ]
        );
    }

    #[test]
    fn test_python_comments_and_docstrings() {
        let content = "\
def area(r):
    \"\"\"area of a circle\"\"\"
    # area again
    return area_of(r)
";
        assert_eq!(
            kinds("geo.py", content, "area"),
            vec![
                (1, 4, CaptureKind::Definition),
                (2, 7, CaptureKind::StringLiteral),
                (3, 6, CaptureKind::Comment),
            ]
        );
    }

    #[test]
    fn test_escaped_quotes_do_not_end_strings() {
        let content = "let s = \"say \\\"hi\\\" hi\"; hi();\n";
        let found = kinds("a.js", content, "hi");
        assert_eq!(
            found.iter().map(|f| f.2).collect::<Vec<_>>(),
            vec![
                CaptureKind::StringLiteral,
                CaptureKind::StringLiteral,
                CaptureKind::Reference,
            ]
        );
    }

    #[test]
    fn test_rust_raw_strings() {
        let content = "\
fn target() {}
let s = r#\"say \"target\" now\"#;
let t = r##\"a \"# target\"##;
let b = br\"target\";
let r#type = target();
";
        assert_eq!(
            kinds("a.rs", content, "target"),
            vec![
                (1, 3, CaptureKind::Definition),
                (2, 16, CaptureKind::StringLiteral),
                (3, 17, CaptureKind::StringLiteral),
                (4, 11, CaptureKind::StringLiteral),
                (5, 13, CaptureKind::Reference),
            ]
        );
    }

    #[test]
    fn test_template_interpolations_are_code() {
        let content = "\
function target() {}
const s = `x ${target()} target`;
const u = `x${target}`;
const v = `${ {k: 1}.target }`;
const w = `\\${target}`;
";
        assert_eq!(
            kinds("a.js", content, "target"),
            vec![
                (1, 9, CaptureKind::Definition),
                (2, 15, CaptureKind::Reference),
                (2, 25, CaptureKind::StringLiteral),
                (3, 14, CaptureKind::Reference),
                (4, 21, CaptureKind::Reference),
                (5, 14, CaptureKind::StringLiteral),
            ]
        );
    }

    #[test]
    fn test_python_format_strings() {
        let content = "\
def target(): pass
print(f\"{target()} {{target}} target\")
print(\"{target}\")
";
        assert_eq!(
            kinds("a.py", content, "target"),
            vec![
                (1, 4, CaptureKind::Definition),
                (2, 9, CaptureKind::Reference),
                (2, 21, CaptureKind::StringLiteral),
                (2, 30, CaptureKind::StringLiteral),
                (3, 8, CaptureKind::StringLiteral),
            ]
        );
    }

    #[test]
    fn test_whole_words_only() {
        let content = "id identifier myid id2 my_id id\n";
        let found = kinds("a.txt", content, "id");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].1, 0);
        assert_eq!(found[1].1, 29);
    }

    #[test]
    fn test_language_detection() {
        assert_eq!(Language::from_path(Path::new("a.rs")), Language::Rust);
        assert_eq!(Language::from_path(Path::new("a.tsx")), Language::JavaScript);
        assert_eq!(Language::from_path(Path::new("a.py")), Language::Python);
        assert_eq!(Language::from_path(Path::new("Makefile")), Language::Generic);
    }
}
