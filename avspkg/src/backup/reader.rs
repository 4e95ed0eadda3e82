//! Decoding backup archives.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::naming::{timestamp_from_unix, BACKUP_EXTENSION};
use super::Backup;
use crate::archive::{read_tar_entry, TarEntryError};
use crate::error::{Error, FormatError, Result, StructuralError};
use crate::instance::Instance;
use crate::storage::Storage;

/// Archive entry holding the instance state.
pub const STATE_ENTRY: &str = "data/state.json";

/// Archive entry holding the snapshot time in decimal Unix seconds.
pub const TIMESTAMP_ENTRY: &str = "timestamp";

/// Load backup metadata from a backup archive.
///
/// Checks run cheapest first: existence, then the `.tar` extension, and only
/// then the archive contents. The state and timestamp entries are each read
/// through their own handle on the archive.
///
/// # Errors
///
/// - `NotExist` if `path` is not an existing file
/// - [`FormatError::InvalidExtension`] if the extension is not `.tar`. A file
///   named exactly `.tar` is a dotfile without an extension and is rejected.
/// - [`StructuralError::MissingEntry`] if a required entry is missing
/// - a decode error if `data/state.json` is malformed
/// - [`FormatError::InvalidTimestamp`] if `timestamp` is not Unix seconds
pub fn backup_from_tar(storage: &dyn Storage, path: &Path) -> Result<Backup> {
    let is_file = storage.is_file(path).map_err(|e| Error::io(path, e))?;
    if !is_file {
        return Err(Error::NotExist {
            path: path.to_path_buf(),
        });
    }

    if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
        return Err(FormatError::InvalidExtension {
            path: path.to_path_buf(),
        }
        .into());
    }

    let instance = read_state(storage, path)?;
    let timestamp = read_timestamp(storage, path)?;

    debug!(
        archive = %path.display(),
        instance_id = %instance.id(),
        timestamp = timestamp.timestamp(),
        "Loaded backup metadata"
    );
    Ok(Backup::from_instance(&instance, timestamp))
}

/// Extract one entry using a freshly opened handle on the archive.
fn extract_entry(storage: &dyn Storage, archive: &Path, entry: &str) -> Result<Vec<u8>> {
    let reader = storage.open(archive).map_err(|e| Error::io(archive, e))?;
    read_tar_entry(reader, entry).map_err(|e| match e {
        TarEntryError::NotFound { entry } => StructuralError::MissingEntry {
            archive: archive.to_path_buf(),
            entry,
        }
        .into(),
        TarEntryError::Io(source) => Error::io(archive, source),
    })
}

fn read_state(storage: &dyn Storage, archive: &Path) -> Result<Instance> {
    let bytes = extract_entry(storage, archive, STATE_ENTRY)?;
    Instance::from_json(&bytes, &archive.join(STATE_ENTRY))
}

fn read_timestamp(storage: &dyn Storage, archive: &Path) -> Result<DateTime<Utc>> {
    let bytes = extract_entry(storage, archive, TIMESTAMP_ENTRY)?;
    let text = String::from_utf8_lossy(&bytes);
    let value = text.trim();
    timestamp_from_unix(value).ok_or_else(|| {
        FormatError::InvalidTimestamp {
            path: archive.to_path_buf(),
            value: value.to_string(),
        }
        .into()
    })
}
