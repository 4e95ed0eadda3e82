//! Package layout and integrity checks.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::checksum::{
    generate_registry, load_registry, serialize_registry, verify_registry, ChecksumEntry,
    REGISTRY_FILE_NAME,
};
use crate::error::{Error, Result, StructuralError};
use crate::storage::Storage;

/// Directory holding the manifest and profile files.
pub const PKG_DIR_NAME: &str = "pkg";

/// Manifest file name inside [`PKG_DIR_NAME`].
pub const MANIFEST_FILE_NAME: &str = "manifest.yml";

/// Outcome of a successful [`PackageHandler::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    /// Every file listed in the registry matched its digest.
    Verified {
        /// Number of files checked.
        files: usize,
    },

    /// No registry was present, or verification was disabled.
    Unverified,
}

impl PackageStatus {
    pub fn is_verified(&self) -> bool {
        matches!(self, PackageStatus::Verified { .. })
    }
}

/// Validates a staged package directory.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use avspkg::package::{PackageHandler, PackageStatus};
/// use avspkg::storage::{MemoryStorage, Storage};
///
/// let storage = MemoryStorage::new();
/// storage.write(Path::new("/mock-avs/pkg/manifest.yml"), b"name: mock-avs").unwrap();
///
/// let handler = PackageHandler::new("/mock-avs");
/// assert_eq!(handler.check(&storage).unwrap(), PackageStatus::Unverified);
///
/// handler.write_registry(&storage).unwrap();
/// assert_eq!(handler.check(&storage).unwrap(), PackageStatus::Verified { files: 1 });
/// ```
#[derive(Debug, Clone)]
pub struct PackageHandler {
    root: PathBuf,
    verify_checksums: bool,
}

impl PackageHandler {
    /// Create a handler for the package rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            verify_checksums: true,
        }
    }

    /// Enable or disable checksum registry verification.
    pub fn with_verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// Package root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the `pkg/` directory.
    pub fn pkg_dir(&self) -> PathBuf {
        self.root.join(PKG_DIR_NAME)
    }

    /// Path of the checksum registry.
    pub fn checksum_path(&self) -> PathBuf {
        self.root.join(REGISTRY_FILE_NAME)
    }

    /// Path of the node manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.pkg_dir().join(MANIFEST_FILE_NAME)
    }

    /// Validate the package layout and, if present, its checksum registry.
    ///
    /// Read-only; repeated calls on an unchanged tree give the same result.
    ///
    /// # Errors
    ///
    /// - [`StructuralError::MissingPath`] if `pkg/` is missing
    /// - a format error if the registry is malformed
    /// - an integrity error if a listed file is missing or modified
    /// - an I/O error if the registry exists but cannot be read
    pub fn check(&self, storage: &dyn Storage) -> Result<PackageStatus> {
        let pkg_dir = self.pkg_dir();
        let present = storage
            .is_dir(&pkg_dir)
            .map_err(|e| Error::io(pkg_dir.clone(), e))?;
        if !present {
            return Err(StructuralError::MissingPath {
                relative_path: PathBuf::from(PKG_DIR_NAME),
                package_root: self.root.clone(),
            }
            .into());
        }

        if !self.verify_checksums {
            debug!(package = %self.root.display(), "Checksum verification disabled");
            return Ok(PackageStatus::Unverified);
        }

        let Some(entries) = load_registry(storage, &self.root)? else {
            info!(package = %self.root.display(), "Package has no checksum registry, skipping integrity check");
            return Ok(PackageStatus::Unverified);
        };

        verify_registry(storage, &self.root, &entries)?;
        Ok(PackageStatus::Verified {
            files: entries.len(),
        })
    }

    /// Generate a registry covering every file under `pkg/` and write it to
    /// `checksum.txt`, replacing any existing registry.
    pub fn write_registry(&self, storage: &dyn Storage) -> Result<Vec<ChecksumEntry>> {
        let entries = generate_registry(storage, &self.root, Path::new(PKG_DIR_NAME))?;
        let path = self.checksum_path();
        storage
            .write(&path, serialize_registry(&entries).as_bytes())
            .map_err(|e| Error::io(path.clone(), e))?;
        info!(package = %self.root.display(), files = entries.len(), "Checksum registry written");
        Ok(entries)
    }
}
