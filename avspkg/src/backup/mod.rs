//! Instance backups.
//!
//! A backup is a plain tar archive named `<instance_id>-<unix_seconds>.tar`
//! holding:
//!
//! - `timestamp`: decimal Unix seconds at which the snapshot was taken
//! - `data/state.json`: the instance state as of the snapshot
//! - `data/...`: every other file of the instance working directory
//!
//! The [`Backup`] value is never stored on its own. It is derived either from
//! the archive contents ([`backup_from_tar`]) or from an instance when the
//! archive is written ([`create_backup`]). The file name can be decoded
//! without opening the archive ([`parse_backup_name`]); the two decoding paths
//! are independent and are not cross-checked.

mod catalog;
mod naming;
mod reader;
mod writer;

pub use catalog::list_backups;
pub use naming::{backup_file_name, parse_backup_name, BackupName, BACKUP_EXTENSION};
pub use reader::{backup_from_tar, STATE_ENTRY, TIMESTAMP_ENTRY};
pub use writer::{create_backup, CreatedBackup};

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};

use crate::checksum::compute_digest;
use crate::instance::Instance;

/// Snapshot metadata of an instance.
///
/// The id is derived from `(instance_id, timestamp, version, commit)` on first
/// use and cached; it is a pure function of those four fields.
#[derive(Debug, Clone)]
pub struct Backup {
    instance_id: String,
    timestamp: DateTime<Utc>,
    version: String,
    commit: String,
    url: String,
    id: OnceLock<String>,
}

impl Backup {
    /// Create a backup value.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::DateTime;
    /// use avspkg::backup::Backup;
    ///
    /// let timestamp = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    /// let a = Backup::new("mock-avs-default", timestamp, "v0.1.0", "d5af645", "https://github.com/NethermindEth/mock-avs");
    /// let b = Backup::new("mock-avs-default", timestamp, "v0.1.0", "d5af645", "https://example.com/fork");
    ///
    /// assert_eq!(a.id(), a.id());
    /// assert_eq!(a.id(), b.id()); // url is not part of the identity
    /// ```
    pub fn new(
        instance_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        version: impl Into<String>,
        commit: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            timestamp,
            version: version.into(),
            commit: commit.into(),
            url: url.into(),
            id: OnceLock::new(),
        }
    }

    /// Create a backup value for `instance` taken at `timestamp`.
    pub fn from_instance(instance: &Instance, timestamp: DateTime<Utc>) -> Self {
        Self::new(
            instance.id(),
            timestamp,
            instance.version.clone(),
            instance.commit.clone(),
            instance.url.clone(),
        )
    }

    /// Backup id: lowercase hex SHA-256 of
    /// `"<instance_id>-<unix_seconds>-<version>-<commit>"`.
    pub fn id(&self) -> &str {
        self.id.get_or_init(|| {
            compute_digest(
                format!(
                    "{}-{}-{}-{}",
                    self.instance_id,
                    self.timestamp.timestamp(),
                    self.version,
                    self.commit
                )
                .as_bytes(),
            )
        })
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn commit(&self) -> &str {
        &self.commit
    }

    /// Source repository URL of the backed-up instance.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Archive file name for this backup.
    pub fn file_name(&self) -> String {
        backup_file_name(&self.instance_id, self.timestamp)
    }
}

impl PartialEq for Backup {
    fn eq(&self, other: &Self) -> bool {
        self.instance_id == other.instance_id
            && self.timestamp == other.timestamp
            && self.version == other.version
            && self.commit == other.commit
            && self.url == other.url
    }
}

impl Eq for Backup {}

impl fmt::Display for Backup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) at {}",
            self.instance_id,
            self.version,
            self.commit,
            self.timestamp.to_rfc3339()
        )
    }
}
