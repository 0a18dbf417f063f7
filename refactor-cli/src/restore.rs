use anyhow::Result;
use refactor_core::{restore_operation, OutputFormatter, ProjectOptions};

use crate::cli::OutputFormat;

pub fn handle_restore(id: &str, options: ProjectOptions, output: OutputFormat) -> Result<()> {
    let result = restore_operation(id, &options)?;

    match output {
        OutputFormat::Json => {
            print!("{}", result.format_json());
        },
        OutputFormat::Summary => {
            print!("{}", result.format_summary());
        },
    }

    Ok(())
}
