//! Storage backed by the real filesystem.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::debug;

use super::{DirEntry, EntryKind, ReadSeek, Storage};

/// [`Storage`] implementation over `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsStorage;

impl OsStorage {
    /// Create a new filesystem-backed storage.
    pub fn new() -> Self {
        Self
    }
}

/// Map a metadata lookup to `Ok(false)` when the path does not exist.
fn metadata_matches(path: &Path, predicate: impl Fn(&fs::Metadata) -> bool) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(meta) => Ok(predicate(&meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

impl Storage for OsStorage {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        path.try_exists()
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        metadata_matches(path, |m| m.is_dir())
    }

    fn is_file(&self, path: &Path) -> io::Result<bool> {
        metadata_matches(path, |m| m.is_file())
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn ReadSeek>> {
        let file = File::open(path)?;
        Ok(Box::new(file))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let entry_path = entry.path();
            // Follow symlinks so linked profile files are treated like regular ones.
            let kind = match fs::metadata(&entry_path) {
                Ok(meta) if meta.is_dir() => EntryKind::Dir,
                Ok(_) => EntryKind::File,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %entry_path.display(), "Skipping dangling symlink");
                    continue;
                }
                Err(e) => return Err(e),
            };
            entries.push(DirEntry {
                path: entry_path,
                kind,
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}
