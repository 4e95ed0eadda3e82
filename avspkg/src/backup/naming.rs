//! Backup archive file names.
//!
//! Format: `<instance_id>-<unix_seconds>.tar`. The timestamp is the rightmost
//! run of digits between a hyphen and the `.tar` suffix, so instance ids that
//! contain hyphens (or end in digits) survive a round trip.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::{FormatError, Result};

/// Extension of backup archives.
pub const BACKUP_EXTENSION: &str = "tar";

/// Instance id and timestamp decoded from a backup file name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BackupName {
    pub instance_id: String,
    pub timestamp: DateTime<Utc>,
}

impl BackupName {
    /// File name for this backup.
    pub fn file_name(&self) -> String {
        backup_file_name(&self.instance_id, self.timestamp)
    }

    /// Path of this backup inside `dir`.
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

impl fmt::Display for BackupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Format the archive file name of a backup.
///
/// Only timestamps at or after the Unix epoch produce names that
/// [`parse_backup_name`] decodes back to the same values.
///
/// # Example
///
/// ```
/// use chrono::DateTime;
/// use avspkg::backup::backup_file_name;
///
/// let timestamp = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
/// assert_eq!(backup_file_name("myavs-node", timestamp), "myavs-node-1700000000.tar");
/// ```
pub fn backup_file_name(instance_id: &str, timestamp: DateTime<Utc>) -> String {
    format!(
        "{}-{}.{}",
        instance_id,
        timestamp.timestamp(),
        BACKUP_EXTENSION
    )
}

/// Backup file name pattern.
///
/// - Group `instance_id`: greedy, so it keeps every hyphen but the last
/// - Group `timestamp`: decimal digits only
fn backup_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?P<instance_id>.*)-(?P<timestamp>[0-9]+)\.tar$").unwrap())
}

/// Convert non-negative Unix seconds into a UTC timestamp.
pub(crate) fn timestamp_from_unix(secs: &str) -> Option<DateTime<Utc>> {
    let secs: u64 = secs.parse().ok()?;
    let secs = i64::try_from(secs).ok()?;
    DateTime::from_timestamp(secs, 0)
}

/// Decode instance id and timestamp from a backup file name.
///
/// # Example
///
/// ```
/// use avspkg::backup::parse_backup_name;
///
/// let name = parse_backup_name("myavs-node-1700000000.tar").unwrap();
/// assert_eq!(name.instance_id, "myavs-node");
/// assert_eq!(name.timestamp.timestamp(), 1_700_000_000);
///
/// assert!(parse_backup_name("invalid.tar").is_err());
/// ```
pub fn parse_backup_name(name: &str) -> Result<BackupName> {
    let invalid = || FormatError::InvalidBackupName {
        name: name.to_string(),
    };

    let captures = backup_name_pattern().captures(name).ok_or_else(invalid)?;
    let instance_id = captures
        .name("instance_id")
        .map(|m| m.as_str())
        .ok_or_else(invalid)?;
    let timestamp = captures
        .name("timestamp")
        .and_then(|m| timestamp_from_unix(m.as_str()))
        .ok_or_else(invalid)?;

    Ok(BackupName {
        instance_id: instance_id.to_string(),
        timestamp,
    })
}
