use anyhow::Result;
use refactor_core::{batch_operation, BatchFlags, OutputFormatter, ProjectOptions};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::cli::{MappingArgs, OutputFormat, PreviewArg};

/// Returns whether the batch stopped early.
#[allow(clippy::too_many_arguments)]
pub fn handle_batch(
    mappings: &MappingArgs,
    paths: Vec<PathBuf>,
    flags: BatchFlags,
    preview: PreviewArg,
    interrupted: Arc<AtomicBool>,
    options: ProjectOptions,
    output: OutputFormat,
    quiet: bool,
) -> Result<bool> {
    let mappings = mappings.load()?;
    let options = ProjectOptions { paths, ..options };

    let (result, preview_content) =
        batch_operation(&mappings, flags, preview.into(), Some(interrupted), &options)?;

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

    Ok(result.report.interrupted)
}
