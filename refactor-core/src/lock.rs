use anyhow::{anyhow, Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

pub const LOCK_FILE_NAME: &str = "refactor.lock";
const STALE_LOCK_TIMEOUT_SECS: u64 = 300;

/// Advisory lock held by a mutating command for its whole run.
///
/// The file holds `pid:timestamp`. A lock older than five minutes, one whose
/// process is gone, or one that cannot be parsed is taken over.
#[derive(Debug)]
pub struct LockFile {
    path: PathBuf,
    content: String,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

impl LockFile {
    pub fn acquire(state_dir: &Path) -> Result<Self> {
        let lock_path = state_dir.join(LOCK_FILE_NAME);

        if let Ok(existing) = fs::read_to_string(&lock_path) {
            let holder = existing
                .trim()
                .split_once(':')
                .and_then(|(pid, ts)| Some((pid.parse::<u32>().ok()?, ts.parse::<u64>().ok()?)));

            match holder {
                Some((pid, timestamp))
                    if now_secs().saturating_sub(timestamp) <= STALE_LOCK_TIMEOUT_SECS
                        && is_process_running(pid) =>
                {
                    return Err(anyhow!(
                        "Another refactor process is already running (PID: {}). \
                        If this is incorrect, remove the lock file at: {}",
                        pid,
                        lock_path.display()
                    ));
                },
                _ => fs::remove_file(&lock_path).context("Failed to remove stale lock file")?,
            }
        }

        fs::create_dir_all(state_dir).context("Failed to create .refactor directory")?;

        let content = format!("{}:{}", process::id(), now_secs());
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .context("Failed to create lock file")?;
        file.write_all(content.as_bytes())
            .context("Failed to write lock file")?;

        Ok(Self {
            path: lock_path,
            content,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_ours(&self) -> bool {
        fs::read_to_string(&self.path).is_ok_and(|c| c.trim() == self.content)
    }

    /// Remove the lock if it is still ours.
    pub fn release(self) -> Result<()> {
        if self.is_ours() {
            fs::remove_file(&self.path).context("Failed to remove lock file")?;
        }
        Ok(())
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if self.is_ours() {
            let _ = fs::remove_file(&self.path);
        }
    }
}

#[cfg(unix)]
fn is_process_running(pid: u32) -> bool {
    // Signal 0 only checks that the process exists
    #[allow(clippy::cast_possible_wrap)]
    unsafe {
        libc::kill(pid as libc::pid_t, 0) == 0
    }
}

#[cfg(windows)]
fn is_process_running(pid: u32) -> bool {
    use winapi::um::handleapi::CloseHandle;
    use winapi::um::processthreadsapi::OpenProcess;
    use winapi::um::winnt::PROCESS_QUERY_INFORMATION;

    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_INFORMATION, 0, pid);
        if handle.is_null() {
            false
        } else {
            CloseHandle(handle);
            true
        }
    }
}

#[cfg(not(any(unix, windows)))]
fn is_process_running(_pid: u32) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_and_release() {
        let temp_dir = TempDir::new().unwrap();
        let state_dir = temp_dir.path().join(".refactor");

        let lock = LockFile::acquire(&state_dir).unwrap();
        assert!(state_dir.join(LOCK_FILE_NAME).exists());
        lock.release().unwrap();
        assert!(!state_dir.join(LOCK_FILE_NAME).exists());
    }

    #[test]
    fn test_second_batch_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let state_dir = temp_dir.path().join(".refactor");

        let _held = LockFile::acquire(&state_dir).unwrap();
        let err = LockFile::acquire(&state_dir).unwrap_err();
        assert!(err.to_string().contains("already running"));
    }

    #[test]
    fn test_stale_orphaned_and_malformed_locks_are_taken_over() {
        let temp_dir = TempDir::new().unwrap();
        let state_dir = temp_dir.path().join(".refactor");
        fs::create_dir_all(&state_dir).unwrap();
        let lock_path = state_dir.join(LOCK_FILE_NAME);

        let stale = format!("{}:{}", process::id(), now_secs() - STALE_LOCK_TIMEOUT_SECS - 100);
        let orphaned = format!("999999:{}", now_secs() - 10);
        for content in [stale.as_str(), orphaned.as_str(), "garbage"] {
            fs::write(&lock_path, content).unwrap();
            let lock = LockFile::acquire(&state_dir).unwrap();
            assert_ne!(fs::read_to_string(&lock_path).unwrap(), content);
            lock.release().unwrap();
        }
    }

    #[test]
    fn test_drop_leaves_foreign_lock_alone() {
        let temp_dir = TempDir::new().unwrap();
        let state_dir = temp_dir.path().join(".refactor");
        let lock_path = state_dir.join(LOCK_FILE_NAME);

        {
            let _lock = LockFile::acquire(&state_dir).unwrap();
            fs::write(&lock_path, "1:1").unwrap();
        }
        assert!(lock_path.exists());

        {
            let _lock = LockFile::acquire(&state_dir).unwrap();
        }
        assert!(!lock_path.exists());
    }

    #[test]
    fn test_process_running_detection() {
        assert!(is_process_running(process::id()));
        assert!(!is_process_running(999_999));
    }
}
