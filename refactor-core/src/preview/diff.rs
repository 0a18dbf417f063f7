use super::display_path;
use crate::executor::ChangedLocation;
use nu_ansi_term::{Color as AnsiColor, Style};
use similar::{ChangeTag, TextDiff};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

/// Highlight every occurrence of `word` on a changed line.
fn highlight_word(line: &str, word: &str, is_delete: bool) -> String {
    let (base, strong) = if is_delete {
        (
            Style::new().fg(AnsiColor::Red),
            Style::new().on(AnsiColor::Red).fg(AnsiColor::White).bold(),
        )
    } else {
        (
            Style::new().fg(AnsiColor::Green),
            Style::new().on(AnsiColor::Green).fg(AnsiColor::Black).bold(),
        )
    };

    if word.is_empty() {
        return base.paint(line).to_string();
    }

    let mut result = String::new();
    let mut rest = line;
    while let Some(index) = rest.find(word) {
        result.push_str(&base.paint(&rest[..index]).to_string());
        result.push_str(&strong.paint(word).to_string());
        rest = &rest[index + word.len()..];
    }
    result.push_str(&base.paint(rest).to_string());
    result
}

/// Render changed lines as unified-style diffs, one section per file.
pub fn render_diff(changes: &[ChangedLocation], old: &str, new: &str, use_color: bool) -> String {
    let mut output = String::new();

    // file -> line -> (before, after); several changes on a line share one entry
    let mut files: BTreeMap<&Path, BTreeMap<usize, (&str, &str)>> = BTreeMap::new();
    for change in changes {
        files
            .entry(change.location.file.as_path())
            .or_default()
            .entry(change.location.line)
            .or_insert((change.before.as_str(), change.after.as_str()));
    }

    for (file, lines) in files {
        let file_str = display_path(file);
        if use_color {
            write!(
                output,
                "{}",
                Style::new()
                    .fg(AnsiColor::White)
                    .bold()
                    .paint(format!("--- {}\n+++ {}\n", file_str, file_str))
            )
            .unwrap();
        } else {
            write!(output, "--- {}\n+++ {}\n", file_str, file_str).unwrap();
        }

        for (line, (before, after)) in lines {
            if use_color {
                write!(
                    output,
                    "{}",
                    AnsiColor::Blue.paint(format!("@@ line {} @@\n", line))
                )
                .unwrap();
            } else {
                writeln!(output, "@@ line {} @@", line).unwrap();
            }

            let before = format!("{}\n", before);
            let after = format!("{}\n", after);
            let diff = TextDiff::from_lines(&before, &after);
            for change in diff.iter_all_changes() {
                let text = change.to_string();
                let text = text.trim_end_matches('\n');
                let written = match (change.tag(), use_color) {
                    (ChangeTag::Delete, true) => writeln!(
                        output,
                        "{}{}",
                        AnsiColor::Red.paint("-"),
                        highlight_word(text, old, true)
                    ),
                    (ChangeTag::Insert, true) => writeln!(
                        output,
                        "{}{}",
                        AnsiColor::Green.paint("+"),
                        highlight_word(text, new, false)
                    ),
                    (ChangeTag::Delete, false) => writeln!(output, "-{}", text),
                    (ChangeTag::Insert, false) => writeln!(output, "+{}", text),
                    (ChangeTag::Equal, _) => writeln!(output, " {}", text),
                };
                written.unwrap();
            }
            output.push('\n');
        }
    }

    output
}
