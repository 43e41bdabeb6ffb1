//! Named storage disks for reading inputs and writing conversion results.
//!
//! `open_from_disk` and `to_disk` address files by `(disk name, path)`
//! rather than touching the local filesystem directly. A [`DiskRegistry`]
//! maps disk names to [`Storage`] implementations; [`LocalDisk`] covers the
//! common rooted-directory case and [`MemoryDisk`] backs tests and fakes.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

/// Byte-oriented access to a named storage location.
pub trait Storage: Send + Sync {
    /// Returns true if a file exists at the given path.
    fn exists(&self, path: &str) -> bool;

    /// Reads the full contents of the file at the given path.
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Writes the contents to the given path, replacing any existing file.
    fn write(&self, path: &str, contents: &[u8]) -> io::Result<()>;
}

/// A storage disk rooted at a local directory.
///
/// Paths are resolved relative to the root; parent directories are created
/// on write.
#[derive(Debug, Clone)]
pub struct LocalDisk {
    root: PathBuf,
}

impl LocalDisk {
    /// Creates a disk rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the absolute path for a disk-relative path.
    pub fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl Storage for LocalDisk {
    fn exists(&self, path: &str) -> bool {
        self.full_path(path).exists()
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(self.full_path(path))
    }

    fn write(&self, path: &str, contents: &[u8]) -> io::Result<()> {
        let full = self.full_path(path);

        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full, contents)
    }
}

/// An in-memory storage disk, primarily for tests.
#[derive(Debug, Default)]
pub struct MemoryDisk {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryDisk {
    /// Creates an empty in-memory disk.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryDisk {
    fn exists(&self, path: &str) -> bool {
        self.files
            .lock()
            .map(|files| files.contains_key(path))
            .unwrap_or(false)
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let files = self
            .files
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "storage lock poisoned"))?;

        files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no such file: {path}")))
    }

    fn write(&self, path: &str, contents: &[u8]) -> io::Result<()> {
        let mut files = self
            .files
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "storage lock poisoned"))?;

        files.insert(path.to_string(), contents.to_vec());
        Ok(())
    }
}

/// A shared mapping from disk name to storage implementation.
///
/// Converter instances hold a handle to the registry so disks registered
/// after an instance was created are still visible to it.
#[derive(Default)]
pub struct DiskRegistry {
    disks: RwLock<HashMap<String, Arc<dyn Storage>>>,
}

impl DiskRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a disk under the given name, replacing any previous one.
    pub fn insert(&self, name: impl Into<String>, storage: Arc<dyn Storage>) {
        if let Ok(mut disks) = self.disks.write() {
            disks.insert(name.into(), storage);
        }
    }

    /// Looks up a disk by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Storage>> {
        self.disks
            .read()
            .ok()
            .and_then(|disks| disks.get(name).cloned())
    }

    /// Returns true if a disk with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl std::fmt::Debug for DiskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .disks
            .read()
            .map(|disks| disks.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("DiskRegistry").field("disks", &names).finish()
    }
}

/// Convenience for registering a [`LocalDisk`] by root path.
pub fn local_disk(root: impl AsRef<Path>) -> Arc<dyn Storage> {
    Arc::new(LocalDisk::new(root.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_disk_round_trip() {
        let disk = MemoryDisk::new();
        assert!(!disk.exists("a/b.png"));

        disk.write("a/b.png", b"bytes").unwrap();
        assert!(disk.exists("a/b.png"));
        assert_eq!(disk.read("a/b.png").unwrap(), b"bytes");
    }

    #[test]
    fn test_local_disk_creates_parents() {
        let dir = TempDir::new().unwrap();
        let disk = LocalDisk::new(dir.path());

        disk.write("nested/out/result.png", b"png").unwrap();
        assert!(disk.exists("nested/out/result.png"));
        assert_eq!(disk.read("nested/out/result.png").unwrap(), b"png");
    }

    #[test]
    fn test_registry_lookup() {
        let registry = DiskRegistry::new();
        assert!(registry.get("local").is_none());

        registry.insert("local", Arc::new(MemoryDisk::new()));
        assert!(registry.contains("local"));
    }
}
