//! Error types for package validation and backup decoding.
//!
//! Every failure surfaced by the library is an [`Error`]. The variants follow a
//! closed taxonomy (see [`ErrorKind`]) and carry the structured context an
//! operator needs to diagnose the failure: the offending path, the expected
//! and actual digest, or the registry line number.
//!
//! Nothing in this crate recovers from these errors. Callers installing or
//! restoring should treat structural, format and integrity errors as hard
//! aborts.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Taxonomy of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required directory or archive entry is missing.
    Structural,
    /// A name, registry line, timestamp or extension is malformed.
    Format,
    /// A checksum-listed file is missing or its content does not match.
    Integrity,
    /// The source path does not exist.
    NotExist,
    /// Embedded metadata could not be decoded.
    Decode,
    /// An I/O failure from the storage capability.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Structural => "structural",
            ErrorKind::Format => "format",
            ErrorKind::Integrity => "integrity",
            ErrorKind::NotExist => "not-exist",
            ErrorKind::Decode => "decode",
            ErrorKind::Io => "io",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while validating packages or handling backups.
#[derive(Debug, Error)]
pub enum Error {
    /// A required directory or archive entry is missing.
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// Malformed input.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Checksum verification failed.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// Source path does not exist.
    #[error("{} does not exist", path.display())]
    NotExist { path: PathBuf },

    /// Embedded metadata could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Storage I/O failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl Error {
    /// Returns the taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Structural(_) => ErrorKind::Structural,
            Error::Format(_) => ErrorKind::Format,
            Error::Integrity(_) => ErrorKind::Integrity,
            Error::NotExist { .. } => ErrorKind::NotExist,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// A required directory or archive entry is missing.
#[derive(Debug, Error)]
pub enum StructuralError {
    /// A required path is missing from a package.
    #[error("required path {} not found in package {}", relative_path.display(), package_root.display())]
    MissingPath {
        relative_path: PathBuf,
        package_root: PathBuf,
    },

    /// A required entry is missing from an archive.
    #[error("entry {entry} not found in archive {}", archive.display())]
    MissingEntry { archive: PathBuf, entry: String },
}

/// Malformed names, registry lines, timestamps or extensions.
#[derive(Debug, Error)]
pub enum FormatError {
    /// File name does not follow `<instance_id>-<unix_timestamp>.tar`.
    #[error("invalid backup name: {name}")]
    InvalidBackupName { name: String },

    /// File extension is not `.tar`.
    #[error("invalid backup file extension: {}", path.display())]
    InvalidExtension { path: PathBuf },

    /// A line of the checksum registry is malformed.
    #[error("malformed checksum registry line {line}: {reason}")]
    ChecksumLine { line: usize, reason: String },

    /// The archived timestamp is not a Unix-seconds integer.
    #[error("invalid timestamp {value:?} in {}", path.display())]
    InvalidTimestamp { path: PathBuf, value: String },
}

/// Checksum verification failures.
///
/// A missing file and a content mismatch are the same kind of failure; the
/// variant only refines the diagnostic.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// A file listed in the registry does not exist.
    #[error("checksum-listed file {} is missing (expected {expected})", path.display())]
    MissingFile { path: PathBuf, expected: String },

    /// A file's digest does not match its registry entry.
    #[error("checksum mismatch for {}: expected {expected}, got {actual}", path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

impl IntegrityError {
    /// Path of the offending file, relative to the package root.
    pub fn path(&self) -> &std::path::Path {
        match self {
            IntegrityError::MissingFile { path, .. } => path,
            IntegrityError::ChecksumMismatch { path, .. } => path,
        }
    }
}

/// Embedded metadata could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The JSON document is malformed or has the wrong shape.
    #[error("failed to decode {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The document decoded but violates an instance invariant.
    #[error("invalid instance state in {}: {reason}", path.display())]
    InvalidInstance { path: PathBuf, reason: String },

    /// The document could not be encoded back to JSON.
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },
}
