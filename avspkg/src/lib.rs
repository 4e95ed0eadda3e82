//! avspkg - AVS node package integrity and instance backups
//!
//! This library validates staged node packages against their checksum
//! registry and reads and writes instance backup archives.
//!
//! All filesystem access goes through a [`storage::Storage`] passed to each
//! operation:
//!
//! ```
//! use std::path::Path;
//! use avspkg::package::PackageHandler;
//! use avspkg::storage::{MemoryStorage, Storage};
//!
//! let storage = MemoryStorage::new();
//! storage.write(Path::new("/packages/mock-avs/pkg/manifest.yml"), b"version: v0.1.0").unwrap();
//!
//! let handler = PackageHandler::new("/packages/mock-avs");
//! handler.write_registry(&storage).unwrap();
//!
//! let status = handler.check(&storage).unwrap();
//! assert!(status.is_verified());
//! ```

pub mod archive;
pub mod assets;
pub mod backup;
pub mod checksum;
pub mod config;
pub mod error;
pub mod instance;
pub mod logging;
pub mod package;
pub mod storage;

pub use error::{Error, ErrorKind, Result};
