pub mod args;
pub mod types;

pub use args::{Cli, Commands, MappingArgs, ScopeArgs};
pub use types::{OutputFormat, PreviewArg};
