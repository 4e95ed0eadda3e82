//! Listing backup archives in a directory.

use std::io;
use std::path::Path;

use tracing::debug;

use super::naming::{parse_backup_name, BackupName, BACKUP_EXTENSION};
use crate::error::{Error, Result};
use crate::storage::Storage;

/// List the backups stored directly in `dir`, oldest first.
///
/// Only file names are inspected; archives are not opened. Files without a
/// `.tar` extension or with an unparseable name are skipped. A missing
/// directory yields an empty list.
pub fn list_backups(storage: &dyn Storage, dir: &Path) -> Result<Vec<BackupName>> {
    let entries = match storage.read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io(dir, e)),
    };

    let mut backups: Vec<BackupName> = entries
        .iter()
        .filter(|entry| entry.is_file())
        .filter(|entry| {
            entry.path.extension().and_then(|ext| ext.to_str()) == Some(BACKUP_EXTENSION)
        })
        .filter_map(|entry| {
            let name = entry.file_name()?;
            match parse_backup_name(name) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    debug!(file = %name, error = %e, "Skipping unrecognized archive");
                    None
                }
            }
        })
        .collect();

    backups.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.instance_id.cmp(&b.instance_id))
    });
    Ok(backups)
}
