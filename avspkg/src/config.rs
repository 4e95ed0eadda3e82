//! Configuration file handling.
//!
//! Settings live in an INI file, by default `<config_dir>/avspkg/config.ini`:
//!
//! ```ini
//! [paths]
//! data_dir = /var/lib/avspkg
//! backups_dir = /var/lib/avspkg/backups
//!
//! [packages]
//! verify_checksums = true
//!
//! [logging]
//! level = info
//! file = /var/log/avspkg.log
//! ```
//!
//! A missing file yields the defaults. Unknown sections and keys are ignored.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::logging::LoggingConfig;

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Directory below `data_dir` holding instance working directories.
pub const NODES_DIR_NAME: &str = "nodes";

/// Directory below `data_dir` used for backups unless overridden.
pub const BACKUPS_DIR_NAME: &str = "backups";

const APP_DIR_NAME: &str = "avspkg";

/// Errors raised while loading or saving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] ini::ParseError),

    #[error("Invalid value '{value}' for {section}.{key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(io::Error),

    #[error("Failed to write config file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Could not determine the user configuration directory")]
    NoConfigDir,
}

/// `[paths]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsConfig {
    /// Root of all persisted state.
    pub data_dir: PathBuf,
    /// Where backups are written; `<data_dir>/backups` when unset.
    pub backups_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR_NAME),
            backups_dir: None,
        }
    }
}

/// `[packages]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagesConfig {
    /// Verify `checksum.txt` when checking a package.
    pub verify_checksums: bool,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            verify_checksums: true,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub paths: PathsConfig,
    pub packages: PackagesConfig,
    pub logging: LoggingConfig,
}

/// Default location of the configuration file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

impl ConfigFile {
    /// Load the configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path()?)
    }

    /// Load the configuration from `path`, falling back to defaults if the
    /// file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parse configuration from INI text.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(contents)?;
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("paths")) {
            if let Some(v) = non_empty(section.get("data_dir")) {
                config.paths.data_dir = PathBuf::from(v);
            }
            if let Some(v) = non_empty(section.get("backups_dir")) {
                config.paths.backups_dir = Some(PathBuf::from(v));
            }
        }

        if let Some(section) = ini.section(Some("packages")) {
            if let Some(v) = non_empty(section.get("verify_checksums")) {
                config.packages.verify_checksums = parse_bool("packages", "verify_checksums", v)?;
            }
        }

        if let Some(section) = ini.section(Some("logging")) {
            if let Some(v) = non_empty(section.get("level")) {
                config.logging.level = v.to_string();
            }
            if let Some(v) = non_empty(section.get("file")) {
                config.logging.file = Some(PathBuf::from(v));
            }
        }

        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();

        let mut paths = ini.with_section(Some("paths"));
        paths.set("data_dir", self.paths.data_dir.to_string_lossy());
        if let Some(dir) = &self.paths.backups_dir {
            paths.set("backups_dir", dir.to_string_lossy());
        }

        ini.with_section(Some("packages")).set(
            "verify_checksums",
            self.packages.verify_checksums.to_string(),
        );

        let mut logging = ini.with_section(Some("logging"));
        logging.set("level", self.logging.level.as_str());
        if let Some(file) = &self.logging.file {
            logging.set("file", file.to_string_lossy());
        }

        ini
    }

    /// Serialize the configuration as INI text.
    pub fn to_ini_string(&self) -> Result<String, ConfigError> {
        let mut buffer = Vec::new();
        self.to_ini()
            .write_to(&mut buffer)
            .map_err(ConfigError::Serialize)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)
    }

    pub fn data_dir(&self) -> &Path {
        &self.paths.data_dir
    }

    /// Directory holding backup archives.
    pub fn backups_dir(&self) -> PathBuf {
        self.paths
            .backups_dir
            .clone()
            .unwrap_or_else(|| self.paths.data_dir.join(BACKUPS_DIR_NAME))
    }

    /// Working directory of the instance with the given id.
    pub fn instance_dir(&self, instance_id: &str) -> PathBuf {
        self.paths.data_dir.join(NODES_DIR_NAME).join(instance_id)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
