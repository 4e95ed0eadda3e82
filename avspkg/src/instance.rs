//! Persisted state of an installed node instance.
//!
//! Each instance has a working directory containing `state.json`, written
//! when the package is provisioned. The same document is embedded in every
//! backup archive as `data/state.json`.
//!
//! ```json
//! {
//!   "name": "mock-avs",
//!   "tag": "default",
//!   "url": "https://github.com/NethermindEth/mock-avs",
//!   "version": "v0.1.0",
//!   "spec_version": "v0.1.0",
//!   "commit": "d5af645fffb93e8263b099082a4f512e1917d0af",
//!   "profile": "option-returner"
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Error, Result};
use crate::storage::Storage;

/// File name of the instance state inside its working directory.
pub const STATE_FILE_NAME: &str = "state.json";

/// Build an instance id from a repository name and tag.
///
/// # Example
///
/// ```
/// assert_eq!(avspkg::instance::instance_id("mock-avs", "default"), "mock-avs-default");
/// ```
pub fn instance_id(name: &str, tag: &str) -> String {
    format!("{}-{}", name, tag)
}

/// A metrics endpoint exposed by an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringTarget {
    pub service: String,
    pub port: u16,
    #[serde(default)]
    pub path: String,
}

/// Monitoring targets registered for an instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringTargets {
    #[serde(default)]
    pub targets: Vec<MonitoringTarget>,
}

/// API endpoint exposed by an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTarget {
    pub service: String,
    pub port: u16,
}

/// Plugin image shipped with an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    pub image: String,
}

/// Persisted instance state (`state.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Repository name of the package.
    pub name: String,

    /// Instance tag chosen at install time.
    pub tag: String,

    /// Source repository URL.
    pub url: String,

    /// Package version.
    pub version: String,

    /// Commit hash the package was built from.
    pub commit: String,

    /// Package specification version.
    #[serde(default)]
    pub spec_version: String,

    /// Selected profile.
    #[serde(default)]
    pub profile: String,

    #[serde(default, rename = "monitoring")]
    pub monitoring_targets: MonitoringTargets,

    #[serde(default, rename = "api", skip_serializing_if = "Option::is_none")]
    pub api_target: Option<ApiTarget>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<Plugin>,
}

impl Instance {
    /// Create an instance with the identity and source fields set.
    pub fn new(
        name: impl Into<String>,
        tag: impl Into<String>,
        url: impl Into<String>,
        version: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
            url: url.into(),
            version: version.into(),
            commit: commit.into(),
            spec_version: String::new(),
            profile: String::new(),
            monitoring_targets: MonitoringTargets::default(),
            api_target: None,
            plugin: None,
        }
    }

    /// Instance id, `<name>-<tag>`.
    pub fn id(&self) -> String {
        instance_id(&self.name, &self.tag)
    }

    /// Decode an instance from JSON. `origin` is only used for error context.
    pub fn from_json(bytes: &[u8], origin: &Path) -> Result<Self> {
        let instance: Instance =
            serde_json::from_slice(bytes).map_err(|source| DecodeError::Json {
                path: origin.to_path_buf(),
                source,
            })?;
        instance.validate(origin)?;
        Ok(instance)
    }

    /// Encode the instance as pretty-printed JSON.
    pub fn to_json(&self, origin: &Path) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|source| {
            DecodeError::Encode {
                path: origin.to_path_buf(),
                source,
            }
            .into()
        })
    }

    /// Load `state.json` from an instance working directory.
    pub fn load(storage: &dyn Storage, instance_dir: &Path) -> Result<Self> {
        let path = instance_dir.join(STATE_FILE_NAME);
        let bytes = storage.read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotExist { path: path.clone() }
            } else {
                Error::io(path.clone(), e)
            }
        })?;
        Self::from_json(&bytes, &path)
    }

    /// Write `state.json` into an instance working directory.
    pub fn save(&self, storage: &dyn Storage, instance_dir: &Path) -> Result<()> {
        let path = instance_dir.join(STATE_FILE_NAME);
        let bytes = self.to_json(&path)?;
        storage.write(&path, &bytes).map_err(|e| Error::io(path, e))
    }

    fn validate(&self, origin: &Path) -> Result<()> {
        let missing = if self.name.is_empty() {
            Some("name")
        } else if self.tag.is_empty() {
            Some("tag")
        } else {
            None
        };
        match missing {
            Some(field) => Err(DecodeError::InvalidInstance {
                path: origin.to_path_buf(),
                reason: format!("{field} must not be empty"),
            }
            .into()),
            None => Ok(()),
        }
    }
}
