use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use refactor_core::{load_mappings, parse_pairs, LineRange, RenameMapping};
use std::path::PathBuf;

use super::types::{OutputFormat, PreviewArg};

/// Syntax-aware identifier renaming across files and projects
#[derive(Parser, Debug)]
#[command(name = "refactor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Reduce the level of "smart" filtering. Can be repeated up to 3 times.
    /// -u: Don't respect .gitignore files
    /// -uu: Don't respect any ignore files (.gitignore, .ignore, .rgignore, .refactorignore), include hidden files
    /// -uuu: Same as -uu, plus treat binary files as text
    #[arg(short = 'u', long = "unrestricted", global = true, action = clap::ArgAction::Count, verbatim_doc_comment)]
    pub unrestricted: u8,

    /// Run as if started in <path> instead of the current working directory
    #[arg(short = 'C', global = true, value_name = "PATH")]
    pub directory: Option<PathBuf>,

    /// AST query command with {file}, {name} and {query} placeholders.
    /// Overrides [query] command in .refactor/config.toml
    #[arg(long, global = true, env = "REFACTOR_QUERY_CMD", value_name = "CMD")]
    pub query_cmd: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "summary")]
    pub output: OutputFormat,
}

/// Where a single rename or lookup applies
#[derive(Args, Debug, Clone)]
pub struct ScopeArgs {
    /// Restrict to one file
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Restrict to a line range of --file, e.g. 10:20
    #[arg(long, value_name = "START:END", requires = "file")]
    pub lines: Option<LineRange>,

    /// Paths to search (defaults to the project root)
    #[arg(conflicts_with = "file")]
    pub paths: Vec<PathBuf>,
}

/// A mapping set from a file and/or the command line
#[derive(Args, Debug, Clone)]
pub struct MappingArgs {
    /// Mapping file: JSON array, JSON object, or one `old=new` per line
    #[arg(long = "mappings", short = 'm', value_name = "FILE", required_unless_present = "map")]
    pub mapping_file: Option<PathBuf>,

    /// Inline mapping, repeatable: --map getUser=fetchUser
    #[arg(long = "map", value_name = "OLD=NEW")]
    pub map: Vec<String>,
}

impl MappingArgs {
    /// File mappings first, then inline ones in the order given
    pub fn load(&self) -> Result<Vec<RenameMapping>> {
        let mut mappings = Vec::new();
        if let Some(path) = &self.mapping_file {
            mappings.extend(
                load_mappings(path)
                    .with_context(|| format!("Failed to load mappings from {}", path.display()))?,
            );
        }
        if !self.map.is_empty() {
            mappings.extend(parse_pairs(&self.map)?);
        }
        Ok(mappings)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every occurrence of an identifier with its role
    Find {
        /// Identifier to look for
        name: String,

        #[command(flatten)]
        scope: ScopeArgs,

        /// Preview format
        #[arg(long, value_enum, default_value = "table")]
        preview: PreviewArg,

        /// Only print the summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Rename one identifier
    Rename {
        /// Current name
        old: String,

        /// New name
        new: String,

        #[command(flatten)]
        scope: ScopeArgs,

        /// Show what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Preview format
        #[arg(long, value_enum, default_value = "diff")]
        preview: PreviewArg,

        /// Only print the summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show the execution order for a mapping set without running it
    Plan {
        #[command(flatten)]
        mappings: MappingArgs,

        /// Paths to search (defaults to the project root)
        paths: Vec<PathBuf>,

        /// Preview format
        #[arg(long, value_enum, default_value = "table")]
        preview: PreviewArg,

        /// Only print the summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run a mapping set, resolving dependencies and cycles
    Batch {
        #[command(flatten)]
        mappings: MappingArgs,

        /// Paths to search (defaults to the project root)
        paths: Vec<PathBuf>,

        /// Show what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Commit the touched files with git afterwards
        #[arg(long)]
        commit: bool,

        /// Skip the per-step backups under .refactor/backups
        #[arg(long)]
        no_snapshot: bool,

        /// Preview format
        #[arg(long, value_enum, default_value = "table")]
        preview: PreviewArg,

        /// Only print the summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Put back the files a batch changed, from its snapshot
    Restore {
        /// Snapshot id under .refactor/backups
        #[arg(default_value = "latest")]
        id: String,
    },

    /// Show version information
    Version,
}
