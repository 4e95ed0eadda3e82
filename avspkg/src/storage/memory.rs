//! In-memory storage for tests and dry runs.
//!
//! Paths are stored verbatim, so callers should use a consistent style
//! (typically absolute paths such as `/packages/mock-avs`). Writing a file
//! implicitly creates all of its ancestors as directories.
//!
//! [`MemoryStorage::deny`] injects a `PermissionDenied` failure for a path,
//! which lets tests exercise error propagation that is hard to provoke on a
//! real filesystem. [`MemoryStorage::open_count`] reports how many read
//! handles were requested.

use std::collections::{BTreeMap, HashSet};
use std::io::{self, Cursor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use super::{DirEntry, EntryKind, ReadSeek, Storage};

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
}

#[derive(Debug, Default)]
struct Inner {
    nodes: BTreeMap<PathBuf, Node>,
    denied: HashSet<PathBuf>,
}

/// [`Storage`] implementation holding everything in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: RwLock<Inner>,
    opens: AtomicUsize,
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} not found", path.display()),
    )
}

fn permission_denied(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("access to {} denied", path.display()),
    )
}

impl MemoryStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent access to `path` fail with `PermissionDenied`.
    pub fn deny(&self, path: impl Into<PathBuf>) {
        self.inner.write().denied.insert(path.into());
    }

    /// Number of [`Storage::open`] calls made so far, including failed ones.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::Relaxed)
    }

    fn check_access(inner: &Inner, path: &Path) -> io::Result<()> {
        if inner.denied.contains(path) {
            return Err(permission_denied(path));
        }
        Ok(())
    }

    fn insert_ancestors(nodes: &mut BTreeMap<PathBuf, Node>, path: &Path) -> io::Result<()> {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            match nodes.get(ancestor) {
                Some(Node::Dir) => {}
                Some(Node::File(_)) => {
                    return Err(io::Error::other(format!("{} is a file", ancestor.display())))
                }
                None => {
                    nodes.insert(ancestor.to_path_buf(), Node::Dir);
                }
            }
        }
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        let inner = self.inner.read();
        Self::check_access(&inner, path)?;
        Ok(inner.nodes.contains_key(path))
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        let inner = self.inner.read();
        Self::check_access(&inner, path)?;
        Ok(matches!(inner.nodes.get(path), Some(Node::Dir)))
    }

    fn is_file(&self, path: &Path) -> io::Result<bool> {
        let inner = self.inner.read();
        Self::check_access(&inner, path)?;
        Ok(matches!(inner.nodes.get(path), Some(Node::File(_))))
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn ReadSeek>> {
        self.opens.fetch_add(1, Ordering::Relaxed);
        let inner = self.inner.read();
        Self::check_access(&inner, path)?;
        match inner.nodes.get(path) {
            Some(Node::File(data)) => Ok(Box::new(Cursor::new(data.clone()))),
            Some(Node::Dir) => Err(io::Error::other(format!("{} is a directory", path.display()))),
            None => Err(not_found(path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut inner = self.inner.write();
        Self::check_access(&inner, path)?;
        if matches!(inner.nodes.get(path), Some(Node::Dir)) {
            return Err(io::Error::other(format!("{} is a directory", path.display())));
        }
        Self::insert_ancestors(&mut inner.nodes, path)?;
        inner
            .nodes
            .insert(path.to_path_buf(), Node::File(contents.to_vec()));
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut inner = self.inner.write();
        Self::check_access(&inner, path)?;
        if matches!(inner.nodes.get(path), Some(Node::File(_))) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is a file", path.display()),
            ));
        }
        Self::insert_ancestors(&mut inner.nodes, path)?;
        inner.nodes.insert(path.to_path_buf(), Node::Dir);
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let inner = self.inner.read();
        Self::check_access(&inner, path)?;
        match inner.nodes.get(path) {
            Some(Node::Dir) => {}
            Some(Node::File(_)) => {
                return Err(io::Error::other(format!("{} is not a directory", path.display())))
            }
            None => return Err(not_found(path)),
        }

        // BTreeMap iteration is already sorted by path.
        let entries = inner
            .nodes
            .iter()
            .filter(|(child, _)| child.parent() == Some(path))
            .map(|(child, node)| DirEntry {
                path: child.clone(),
                kind: match node {
                    Node::File(_) => EntryKind::File,
                    Node::Dir => EntryKind::Dir,
                },
            })
            .collect();
        Ok(entries)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut inner = self.inner.write();
        Self::check_access(&inner, path)?;
        match inner.nodes.get(path) {
            Some(Node::File(_)) => {
                inner.nodes.remove(path);
                Ok(())
            }
            Some(Node::Dir) => Err(io::Error::other(format!("{} is a directory", path.display()))),
            None => Err(not_found(path)),
        }
    }
}
