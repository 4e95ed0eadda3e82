//! Writing backup archives.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info};

use super::naming::backup_file_name;
use super::reader::TIMESTAMP_ENTRY;
use super::Backup;
use crate::archive::TarWriter;
use crate::error::{Error, FormatError, Result};
use crate::instance::Instance;
use crate::storage::{walk_files, Storage};

/// Directory inside the archive that holds the instance working directory.
const DATA_DIR: &str = "data";

/// Result of [`create_backup`].
#[derive(Debug, Clone)]
pub struct CreatedBackup {
    /// Metadata of the new backup.
    pub backup: Backup,
    /// Where the archive was written.
    pub path: PathBuf,
}

/// Snapshot an instance working directory into a backup archive.
///
/// The archive lands in `backups_dir` under [`backup_file_name`]. The
/// `timestamp` entry is written first, followed by every file of
/// `instance_dir` below `data/`. An existing archive with the same name is
/// never overwritten. Sub-second precision of `timestamp` is dropped, and
/// timestamps before the Unix epoch are rejected since their file names would
/// not parse back.
pub fn create_backup(
    storage: &dyn Storage,
    instance_dir: &Path,
    backups_dir: &Path,
    timestamp: DateTime<Utc>,
) -> Result<CreatedBackup> {
    let timestamp = timestamp.trunc_subsecs(0);
    let unix = u64::try_from(timestamp.timestamp()).map_err(|_| FormatError::InvalidTimestamp {
        path: backups_dir.to_path_buf(),
        value: timestamp.timestamp().to_string(),
    })?;
    let instance = Instance::load(storage, instance_dir)?;
    let backup = Backup::from_instance(&instance, timestamp);
    let target = backups_dir.join(backup_file_name(backup.instance_id(), timestamp));

    let exists = storage.exists(&target).map_err(|e| Error::io(&target, e))?;
    if exists {
        return Err(Error::io(
            &target,
            io::Error::new(io::ErrorKind::AlreadyExists, "backup already exists"),
        ));
    }

    let files = walk_files(storage, instance_dir).map_err(|e| Error::io(instance_dir, e))?;

    let mut writer = TarWriter::new(Vec::new()).with_mtime(unix);
    writer
        .append_file(TIMESTAMP_ENTRY, unix.to_string().as_bytes())
        .map_err(|e| Error::io(&target, e))?;

    for file in &files {
        let relative = file.strip_prefix(instance_dir).unwrap_or(file);
        let entry = archive_entry_name(relative);
        let data = storage.read(file).map_err(|e| Error::io(file, e))?;
        debug!(entry = %entry, size = data.len(), "Adding file to backup");
        writer
            .append_file(&entry, &data)
            .map_err(|e| Error::io(&target, e))?;
    }

    let bytes = writer.finish().map_err(|e| Error::io(&target, e))?;
    storage
        .write(&target, &bytes)
        .map_err(|e| Error::io(&target, e))?;

    info!(
        instance_id = %backup.instance_id(),
        archive = %target.display(),
        files = files.len(),
        "Created backup"
    );

    Ok(CreatedBackup {
        backup,
        path: target,
    })
}

/// `data/<relative>` with forward slashes regardless of platform.
fn archive_entry_name(relative: &Path) -> String {
    let mut name = String::from(DATA_DIR);
    for component in relative.components() {
        name.push('/');
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    name
}
