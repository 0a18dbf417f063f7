//! Loading mapping sets.
//!
//! Accepted formats:
//! - JSON array: `[{"old": "a", "new": "b"}]`
//! - JSON object: `{"a": "b"}`, in file order
//! - text, one mapping per line: `a=b`, `a -> b` or `a b`, with `#` comments

use crate::error::{RefactorError, Result};
use crate::planner::RenameMapping;
use std::fs;
use std::path::Path;

pub fn load_mappings(path: &Path) -> Result<Vec<RenameMapping>> {
    let content = fs::read_to_string(path).map_err(|e| {
        RefactorError::invalid(format!(
            "cannot read mapping file {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_mappings(&content)
}

pub fn parse_mappings(content: &str) -> Result<Vec<RenameMapping>> {
    let trimmed = content.trim_start();
    let mappings = if trimmed.starts_with('[') || trimmed.starts_with('{') {
        parse_json(trimmed)?
    } else {
        parse_lines(content)?
    };

    if mappings.is_empty() {
        return Err(RefactorError::invalid("mapping set is empty"));
    }
    Ok(mappings)
}

fn parse_json(content: &str) -> Result<Vec<RenameMapping>> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| RefactorError::invalid(format!("malformed mapping JSON: {}", e)))?;

    match value {
        serde_json::Value::Array(_) => serde_json::from_value(value).map_err(|e| {
            RefactorError::invalid(format!(
                "mapping entries need string \"old\" and \"new\" fields: {}",
                e
            ))
        }),
        // Relies on serde_json's preserve_order feature
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(old, new)| match new {
                serde_json::Value::String(new) => Ok(RenameMapping::new(old, new)),
                other => Err(RefactorError::invalid(format!(
                    "mapping for '{}' must be a string, got {}",
                    old, other
                ))),
            })
            .collect(),
        _ => Err(RefactorError::invalid(
            "mapping JSON must be an array or an object",
        )),
    }
}

fn parse_lines(content: &str) -> Result<Vec<RenameMapping>> {
    let mut mappings = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.split_once('#').map_or(raw, |(code, _)| code).trim();
        if line.is_empty() {
            continue;
        }

        let pair = line
            .split_once("->")
            .or_else(|| line.split_once('='))
            .map(|(old, new)| (old.trim(), new.trim()))
            .or_else(|| {
                let mut words = line.split_whitespace();
                match (words.next(), words.next(), words.next()) {
                    (Some(old), Some(new), None) => Some((old, new)),
                    _ => None,
                }
            });

        match pair {
            Some((old, new)) if !old.is_empty() && !new.is_empty() => {
                mappings.push(RenameMapping::new(old, new));
            },
            _ => {
                return Err(RefactorError::invalid(format!(
                    "line {}: expected 'old=new', 'old -> new' or 'old new', got '{}'",
                    index + 1,
                    raw.trim()
                )));
            },
        }
    }

    Ok(mappings)
}

/// Parse `old=new` command-line pairs.
pub fn parse_pairs(pairs: &[String]) -> Result<Vec<RenameMapping>> {
    parse_mappings(&pairs.join("\n"))
}
