use memmap2::Mmap;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Read/write access to project files.
///
/// The executor never touches the filesystem directly so the same code path
/// serves real runs ([`DiskStore`]) and dry runs ([`OverlayStore`]).
pub trait FileStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    fn write(&mut self, path: &Path, content: &[u8]) -> io::Result<()>;
    fn exists(&self, path: &Path) -> bool;
}

/// Files on disk, rewritten atomically.
#[derive(Debug, Default)]
pub struct DiskStore;

impl FileStore for DiskStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        read_file_content(path)
    }

    fn write(&mut self, path: &Path, content: &[u8]) -> io::Result<()> {
        write_atomically(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Disk reads with pending writes kept in memory. Nothing is ever written.
#[derive(Debug, Default)]
pub struct OverlayStore {
    pending: HashMap<PathBuf, Vec<u8>>,
}

impl OverlayStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileStore for OverlayStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        match self.pending.get(path) {
            Some(content) => Ok(content.clone()),
            None => read_file_content(path),
        }
    }

    fn write(&mut self, path: &Path, content: &[u8]) -> io::Result<()> {
        if !path.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} no longer exists", path.display()),
            ));
        }
        self.pending.insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.pending.contains_key(path) || path.is_file()
    }
}

pub(crate) fn read_file_content(path: &Path) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let metadata = file.metadata()?;

    // Mapping an empty file fails on some platforms
    if metadata.len() == 0 || metadata.len() > 50 * 1024 * 1024 {
        let mut content = Vec::new();
        File::open(path)?.read_to_end(&mut content)?;
        Ok(content)
    } else {
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(mmap.to_vec())
    }
}

/// Write through a temp file in the same directory and rename over the
/// original, keeping its permissions.
fn write_atomically(path: &Path, content: &[u8]) -> io::Result<()> {
    let original_permissions = fs::metadata(path)?.permissions();
    let temp_path = path.with_extension(format!("{}.refactor.tmp", std::process::id()));

    let result = (|| {
        let mut temp_file = File::create(&temp_path)?;
        temp_file.write_all(content)?;
        temp_file.sync_all()?;
        fs::set_permissions(&temp_path, original_permissions)?;
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
        return result;
    }

    #[cfg(unix)]
    {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            File::open(parent)?.sync_all()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_disk_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.rs");
        fs::write(&path, "fn old() {}\n").unwrap();

        let mut store = DiskStore;
        assert!(store.exists(&path));
        store.write(&path, b"fn new() {}\n").unwrap();
        assert_eq!(store.read(&path).unwrap(), b"fn new() {}\n");

        // No temp files left behind
        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_disk_store_reads_empty_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.rs");
        fs::write(&path, "").unwrap();
        assert!(DiskStore.read(&path).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_disk_store_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("run.sh");
        fs::write(&path, "echo old\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        DiskStore.write(&path, b"echo new\n").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_overlay_never_touches_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.rs");
        fs::write(&path, "old").unwrap();
        let modified_before = fs::metadata(&path).unwrap().modified().unwrap();

        let mut overlay = OverlayStore::new();
        overlay.write(&path, b"new").unwrap();

        assert_eq!(overlay.read(&path).unwrap(), b"new");
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert_eq!(
            fs::metadata(&path).unwrap().modified().unwrap(),
            modified_before
        );
        assert_eq!(OverlayStore::new().read(&path).unwrap(), b"old");
    }

    #[test]
    fn test_overlay_write_to_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut overlay = OverlayStore::new();
        assert!(overlay
            .write(&temp_dir.path().join("gone.rs"), b"x")
            .is_err());
    }
}
