use super::{Project, ProjectOptions};
use crate::capture::LineRange;
use crate::executor::RenameExecutor;
use crate::log::OperationLog;
use crate::output::FindResult;
use crate::preview::{render_occurrences, should_use_color, Preview};
use crate::store::DiskStore;
use anyhow::{Context, Result};
use std::path::Path;

/// Find operation - lists every occurrence of `name` with its role
pub fn find_operation(
    name: &str,
    file: Option<&Path>,
    lines: Option<LineRange>,
    preview: Preview,
    options: &ProjectOptions,
) -> Result<(FindResult, Option<String>)> {
    let project = Project::open(options)?;
    let scope = project.scope(file, lines, &options.paths)?;

    let log = OperationLog::disabled();
    let executor = RenameExecutor::new(project.source.as_ref(), &project.filter, &log);
    let (occurrences, failures) = executor
        .find(&DiskStore, name, &scope)
        .with_context(|| format!("Failed to find '{}'", name))?;

    let use_color = should_use_color(options.use_color.or(project.config.defaults.use_color));
    let preview_content = match preview {
        Preview::None => None,
        _ if occurrences.is_empty() => None,
        Preview::Table | Preview::Diff => Some(render_occurrences(&occurrences, use_color)),
    };

    Ok((
        FindResult {
            name: name.to_string(),
            occurrences,
            failures,
        },
        preview_content,
    ))
}
