//! Tar archive access.
//!
//! Backups are plain (uncompressed) tar archives. This module offers the two
//! primitives the backup codec needs:
//!
//! - [`read_tar_entry`]: pull one named entry out of an archive without
//!   extracting anything else
//! - [`TarWriter`]: append in-memory files with deterministic headers

mod reader;
mod writer;

pub use reader::{read_tar_entry, TarEntryError};
pub use writer::TarWriter;
