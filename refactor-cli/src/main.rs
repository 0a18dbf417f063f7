use anyhow::{Context, Result};
use clap::Parser;
use refactor_core::{
    BatchFlags, OutputFormatter, ProjectOptions, RefactorError, VersionResult,
};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod batch;
mod cli;
mod find;
mod plan;
mod rename;
mod restore;

use cli::{Cli, Commands, OutputFormat};

fn main() {
    // Set up signal handler for graceful shutdown (both SIGINT and SIGTERM)
    let interrupted = Arc::new(AtomicBool::new(false));

    // Handle SIGINT (Ctrl-C)
    let interrupted_clone = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        eprintln!("\nReceived SIGINT. Stopping after the current step...");
        interrupted_clone.store(true, Ordering::SeqCst);
    })
    .expect("Error setting SIGINT handler");

    // Handle SIGTERM
    #[cfg(unix)]
    {
        let interrupted_clone = Arc::clone(&interrupted);
        unsafe {
            signal_hook::low_level::register(signal_hook::consts::SIGTERM, move || {
                interrupted_clone.store(true, Ordering::SeqCst);
            })
            .expect("Error setting SIGTERM handler");
        }
    }

    let cli = Cli::parse();

    // Handle -C directory flag
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir)
            .with_context(|| format!("Failed to change to directory: {}", dir.display()))
            .unwrap_or_else(|e| {
                eprintln!("Error: {e:#}");
                process::exit(2);
            });
    }

    let options = ProjectOptions {
        working_dir: None,
        paths: Vec::new(),
        unrestricted_level: (cli.unrestricted > 0).then_some(cli.unrestricted),
        query_command: cli.query_cmd.clone(),
        use_color: cli.no_color.then_some(false),
    };
    let output = cli.output;

    let result = match cli.command {
        Commands::Find {
            name,
            scope,
            preview,
            quiet,
        } => find::handle_find(&name, scope, preview, options, output, quiet),

        Commands::Rename {
            old,
            new,
            scope,
            dry_run,
            preview,
            quiet,
        } => rename::handle_rename(&old, &new, scope, dry_run, preview, options, output, quiet),

        Commands::Plan {
            mappings,
            paths,
            preview,
            quiet,
        } => plan::handle_plan(&mappings, paths, preview, options, output, quiet),

        Commands::Batch {
            mappings,
            paths,
            dry_run,
            commit,
            no_snapshot,
            preview,
            quiet,
        } => batch::handle_batch(
            &mappings,
            paths,
            BatchFlags {
                dry_run,
                commit,
                no_snapshot,
            },
            preview,
            Arc::clone(&interrupted),
            options,
            output,
            quiet,
        )
        .map(|stopped| {
            if stopped {
                eprintln!("Batch interrupted; completed steps stay applied.");
            }
        }),

        Commands::Restore { id } => restore::handle_restore(&id, options, output),

        Commands::Version => handle_version(output),
    };

    // Steps already applied are reported above; exit like other interrupted tools
    if interrupted.load(Ordering::SeqCst) {
        process::exit(130);
    }

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(exit_code(&e));
        },
    }
}

/// 2 for bad input or a missing file, 3 for everything else.
fn exit_code(error: &anyhow::Error) -> i32 {
    let input_error = error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<RefactorError>())
        .any(RefactorError::is_input_error);
    if input_error {
        2
    } else {
        3
    }
}

fn handle_version(output: OutputFormat) -> Result<()> {
    let version_result = VersionResult {
        name: "refactor".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    println!("{}", version_result.format(output.into()));
    Ok(())
}
