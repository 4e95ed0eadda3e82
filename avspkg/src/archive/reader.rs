//! Single-entry extraction from a tar stream.

use std::io::{self, Read, Seek};
use std::path::Path;

use thiserror::Error;

/// Errors returned by [`read_tar_entry`].
#[derive(Debug, Error)]
pub enum TarEntryError {
    /// The archive was read to the end without finding the entry.
    #[error("entry {entry} not found in archive")]
    NotFound { entry: String },

    /// The archive could not be read or is not a valid tar stream.
    #[error("failed to read archive: {0}")]
    Io(#[from] io::Error),
}

/// Read the contents of the first entry named `entry` from a tar stream.
///
/// Entry headers are scanned in order; the bodies of non-matching entries are
/// skipped by seeking rather than read. The stream is consumed, so each call
/// needs its own freshly opened handle.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use avspkg::archive::{read_tar_entry, TarWriter};
///
/// let mut writer = TarWriter::new(Vec::new());
/// writer.append_file("timestamp", b"1700000000").unwrap();
/// writer.append_file("data/state.json", b"{}").unwrap();
/// let bytes = writer.finish().unwrap();
///
/// let data = read_tar_entry(Cursor::new(&bytes), "data/state.json").unwrap();
/// assert_eq!(data, b"{}");
/// assert!(read_tar_entry(Cursor::new(&bytes), "missing").is_err());
/// ```
pub fn read_tar_entry<R: Read + Seek>(archive: R, entry: &str) -> Result<Vec<u8>, TarEntryError> {
    let target = Path::new(entry);
    let mut archive = tar::Archive::new(archive);

    for item in archive.entries_with_seek()? {
        let mut item = item?;
        let is_target = &*item.path()? == target;
        if !is_target {
            continue;
        }

        let mut data = Vec::new();
        item.read_to_end(&mut data)?;
        return Ok(data);
    }

    Err(TarEntryError::NotFound {
        entry: entry.to_string(),
    })
}
