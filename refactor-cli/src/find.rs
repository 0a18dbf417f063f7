use anyhow::Result;
use refactor_core::{find_operation, OutputFormatter, ProjectOptions};

use crate::cli::{OutputFormat, PreviewArg, ScopeArgs};

pub fn handle_find(
    name: &str,
    scope: ScopeArgs,
    preview: PreviewArg,
    options: ProjectOptions,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let options = ProjectOptions {
        paths: scope.paths,
        ..options
    };

    let (result, preview_content) = find_operation(
        name,
        scope.file.as_deref(),
        scope.lines,
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
