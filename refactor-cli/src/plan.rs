use anyhow::Result;
use refactor_core::{plan_operation, OutputFormatter, ProjectOptions};
use std::path::PathBuf;

use crate::cli::{MappingArgs, OutputFormat, PreviewArg};

pub fn handle_plan(
    mappings: &MappingArgs,
    paths: Vec<PathBuf>,
    preview: PreviewArg,
    options: ProjectOptions,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let mappings = mappings.load()?;
    let options = ProjectOptions { paths, ..options };

    let (result, preview_content) = plan_operation(mappings, preview.into(), &options)?;

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
