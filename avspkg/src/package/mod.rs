//! Staged package validation.
//!
//! A package is a directory fetched from a node repository before install:
//!
//! ```text
//! mock-avs/
//! ├── checksum.txt          (optional integrity registry)
//! └── pkg/
//!     ├── manifest.yml
//!     └── <profile files>
//! ```
//!
//! [`PackageHandler::check`] confirms the layout and, when a registry is
//! present, that every tracked file is unmodified. A package without a
//! registry is structurally valid but unverified; it is never rejected for
//! that alone.

mod handler;

pub use handler::{PackageHandler, PackageStatus, MANIFEST_FILE_NAME, PKG_DIR_NAME};
