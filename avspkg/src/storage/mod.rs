//! Storage capability used by every package and backup operation.
//!
//! The library never touches real paths directly. Each operation takes a
//! [`Storage`] implementation as an explicit parameter, so the same code runs
//! against the real filesystem ([`OsStorage`]) or an in-memory double
//! ([`MemoryStorage`]) in tests.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use avspkg::storage::{MemoryStorage, Storage};
//!
//! let storage = MemoryStorage::new();
//! storage.write(Path::new("/pkg/manifest.yml"), b"version: 1").unwrap();
//!
//! assert!(storage.is_dir(Path::new("/pkg")).unwrap());
//! assert_eq!(storage.read(Path::new("/pkg/manifest.yml")).unwrap(), b"version: 1");
//! ```

mod memory;
mod os;

pub use memory::MemoryStorage;
pub use os::OsStorage;

use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};

/// A readable, seekable stream handed out by [`Storage::open`].
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Type of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// An entry returned by [`Storage::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Full path of the entry.
    pub path: PathBuf,
    /// Whether the entry is a file or a directory.
    pub kind: EntryKind,
}

impl DirEntry {
    /// Final component of the entry path as UTF-8, if representable.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Filesystem operations required by the library.
///
/// Implementations must be safe to share across threads; callers may run
/// read-only operations on distinct paths concurrently.
pub trait Storage: Send + Sync {
    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Whether `path` is an existing directory.
    fn is_dir(&self, path: &Path) -> io::Result<bool>;

    /// Whether `path` is an existing regular file.
    fn is_file(&self, path: &Path) -> io::Result<bool>;

    /// Open `path` for reading. Each call returns an independent handle.
    fn open(&self, path: &Path) -> io::Result<Box<dyn ReadSeek>>;

    /// Read the entire contents of `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let mut reader = self.open(path)?;
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// Write `contents` to `path`, creating missing parent directories and
    /// replacing any existing file.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Create `path` and all of its missing ancestors.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// List the direct children of `path`, sorted by path.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Remove the file at `path`.
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// Collect every regular file below `dir`, recursively, in lexical order.
pub fn walk_files(storage: &dyn Storage, dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in storage.read_dir(&current)? {
            match entry.kind {
                EntryKind::Dir => pending.push(entry.path),
                EntryKind::File => files.push(entry.path),
            }
        }
    }

    files.sort();
    Ok(files)
}
