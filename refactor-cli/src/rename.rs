use anyhow::Result;
use refactor_core::{rename_operation, OutputFormatter, ProjectOptions};

use crate::cli::{OutputFormat, PreviewArg, ScopeArgs};

#[allow(clippy::too_many_arguments)]
pub fn handle_rename(
    old: &str,
    new: &str,
    scope: ScopeArgs,
    dry_run: bool,
    preview: PreviewArg,
    options: ProjectOptions,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let options = ProjectOptions {
        paths: scope.paths,
        ..options
    };

    let (result, preview_content) = rename_operation(
        old,
        new,
        scope.file.as_deref(),
        scope.lines,
        dry_run,
        preview.into(),
        &options,
    )?;

    match output {
        OutputFormat::Json => {
            print!("{}", result.format_json());
        },
        OutputFormat::Summary => {
            if !quiet {
                if let Some(preview) = preview_content {
                    println!("{}", preview);
                }
            }
            print!("{}", result.format_summary());
        },
    }

    Ok(())
}
