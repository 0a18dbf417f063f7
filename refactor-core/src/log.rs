use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const LOG_FILE_NAME: &str = "refactor.log";

/// Append-only operation log at `<state dir>/refactor.log`.
///
/// Write errors are swallowed: a full disk must not fail a rename that has
/// already succeeded.
#[derive(Debug)]
pub struct OperationLog {
    path: Option<PathBuf>,
    file: Option<Mutex<File>>,
}

impl OperationLog {
    pub fn open(state_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(state_dir)?;
        let path = state_dir.join(LOG_FILE_NAME);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path: Some(path),
            file: Some(Mutex::new(file)),
        })
    }

    pub fn disabled() -> Self {
        Self {
            path: None,
            file: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn log(&self, message: impl AsRef<str>) {
        let Some(file) = &self.file else {
            return;
        };
        let Ok(mut file) = file.lock() else {
            return;
        };
        let _ = writeln!(
            file,
            "[{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            message.as_ref()
        );
        let _ = file.flush();
    }
}

impl Default for OperationLog {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lines_are_timestamped_and_appended() {
        let temp_dir = TempDir::new().unwrap();
        let state_dir = temp_dir.path().join(".refactor");

        let log = OperationLog::open(&state_dir).unwrap();
        log.log("batch started");
        log.log("step 1: a -> b");
        drop(log);

        let log = OperationLog::open(&state_dir).unwrap();
        log.log("batch finished");

        let content = fs::read_to_string(state_dir.join(LOG_FILE_NAME)).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] batch started"));
        assert!(lines[2].ends_with("] batch finished"));
    }

    #[test]
    fn test_disabled_log_writes_nothing() {
        let log = OperationLog::disabled();
        log.log("ignored");
        assert!(log.path().is_none());
    }
}
