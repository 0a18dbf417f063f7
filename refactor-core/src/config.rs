use crate::query::{CaptureSource, LexicalSource, QueryCommand};
use crate::search::{FileFilter, STATE_DIR};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    /// Extensions to search, without the dot. Empty means every text file.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Default unrestricted level (0=respect gitignore, 1=-u, 2=-uu, 3=-uuu)
    #[serde(default)]
    pub unrestricted_level: u8,

    /// Whether to use color output by default (None = auto-detect)
    #[serde(default)]
    pub use_color: Option<bool>,

    /// Back up files before each batch step
    #[serde(default = "default_true")]
    pub create_snapshots: bool,

    /// Commit after a successful batch
    #[serde(default)]
    pub commit: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            extensions: Vec::new(),
            unrestricted_level: 0,
            use_color: None,
            create_snapshots: true,
            commit: false,
        }
    }
}

/// External AST query tool. Without a command the built-in lexical source
/// is used.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct QueryConfig {
    /// Command line with `{file}`, `{name}` and `{query}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load `<root>/.refactor/config.toml`, or defaults when there is none.
    pub fn load_from_dir(root: &Path) -> Result<Self> {
        let config_path = root.join(STATE_DIR).join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Self::load_from_path(&config_path);
        }
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn filter(&self) -> FileFilter {
        FileFilter {
            include: self.defaults.include.clone(),
            exclude: self.defaults.exclude.clone(),
            extensions: self.defaults.extensions.clone(),
            unrestricted_level: self.defaults.unrestricted_level,
        }
    }

    /// Capture source for this project. A relative query file is resolved
    /// against `root`.
    pub fn capture_source(&self, root: &Path) -> Result<Box<dyn CaptureSource>> {
        match &self.query.command {
            Some(command) => {
                let query_file = self.query.query_file.as_ref().map(|q| root.join(q));
                Ok(Box::new(QueryCommand::parse(command, query_file)?))
            },
            None => Ok(Box::new(LexicalSource)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.defaults.include.is_empty());
        assert!(config.defaults.create_snapshots);
        assert!(!config.defaults.commit);
        assert_eq!(config.defaults.unrestricted_level, 0);
        assert_eq!(config.defaults.use_color, None);
        assert!(config.query.command.is_none());
    }

    #[test]
    fn test_load_save_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(".refactor").join("config.toml");

        let mut config = Config::default();
        config.defaults.exclude = vec!["vendor/**".to_string()];
        config.defaults.extensions = vec!["rs".to_string(), "py".to_string()];
        config.defaults.unrestricted_level = 1;
        config.defaults.commit = true;
        config.query.command = Some("tree-sitter query {query} {file}".to_string());
        config.query.query_file = Some(PathBuf::from("queries/rename.scm"));
        config.save_to_path(&config_path).unwrap();

        let loaded = Config::load_from_dir(temp_dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config() {
        let toml_content = r#"
[defaults]
extensions = ["ts"]
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.defaults.extensions, vec!["ts".to_string()]);
        assert!(config.defaults.create_snapshots);
        assert!(config.query.query_file.is_none());
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from_dir(temp_dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_query_command_rejected() {
        let mut config = Config::default();
        config.query.command = Some("tool {query} {file}".to_string());
        assert!(config.capture_source(Path::new(".")).is_err());

        config.query.query_file = Some(PathBuf::from("q.scm"));
        assert!(config.capture_source(Path::new(".")).is_ok());
    }

    #[test]
    fn test_filter_from_defaults() {
        let mut config = Config::default();
        config.defaults.include = vec!["src/**".to_string()];
        config.defaults.unrestricted_level = 2;
        let filter = config.filter();
        assert_eq!(filter.include, vec!["src/**".to_string()]);
        assert_eq!(filter.unrestricted_level, 2);
    }
}
