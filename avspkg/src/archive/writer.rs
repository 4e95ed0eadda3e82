//! Tar archive construction.

use std::io::{self, Write};

use tar::{Builder, EntryType, Header};

/// Appends regular-file entries to a tar stream.
///
/// Headers are deterministic: mode `0644`, uid/gid `0`, and a caller-chosen
/// modification time (defaults to `0`), so identical inputs yield identical
/// archives.
pub struct TarWriter<W: Write> {
    builder: Builder<W>,
    mtime: u64,
}

impl<W: Write> TarWriter<W> {
    /// Start a new archive writing into `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            builder: Builder::new(writer),
            mtime: 0,
        }
    }

    /// Set the modification time stamped on subsequent entries.
    pub fn with_mtime(mut self, mtime: u64) -> Self {
        self.mtime = mtime;
        self
    }

    /// Append a regular file named `path` with the given contents.
    pub fn append_file(&mut self, path: &str, data: &[u8]) -> io::Result<()> {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_uid(0);
        header.set_gid(0);
        header.set_mtime(self.mtime);
        // append_data writes the path (with GNU long-name support) and checksum.
        self.builder.append_data(&mut header, path, data)
    }

    /// Write the end-of-archive marker and return the inner writer.
    pub fn finish(self) -> io::Result<W> {
        self.builder.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_entries_are_listed_in_append_order() {
        let mut writer = TarWriter::new(Vec::new()).with_mtime(1_700_000_000);
        writer.append_file("timestamp", b"1700000000").unwrap();
        writer.append_file("data/state.json", b"{}").unwrap();
        let bytes = writer.finish().unwrap();

        let mut archive = tar::Archive::new(Cursor::new(bytes));
        let entries: Vec<(String, u64)> = archive
            .entries()
            .unwrap()
            .map(|e| {
                let e = e.unwrap();
                let mtime = e.header().mtime().unwrap();
                (e.path().unwrap().to_string_lossy().to_string(), mtime)
            })
            .collect();

        assert_eq!(
            entries,
            vec![
                ("timestamp".to_string(), 1_700_000_000),
                ("data/state.json".to_string(), 1_700_000_000),
            ]
        );
    }

    #[test]
    fn test_long_paths_are_supported() {
        let long_path = format!("data/{}/state.json", "nested".repeat(30));
        let mut writer = TarWriter::new(Vec::new());
        writer.append_file(&long_path, b"deep").unwrap();
        let bytes = writer.finish().unwrap();

        let data = crate::archive::read_tar_entry(Cursor::new(bytes), &long_path).unwrap();
        assert_eq!(data, b"deep");
    }

    #[test]
    fn test_identical_input_produces_identical_archives() {
        let build = || {
            let mut writer = TarWriter::new(Vec::new()).with_mtime(42);
            writer.append_file("a.txt", b"a").unwrap();
            writer.finish().unwrap()
        };
        assert_eq!(build(), build());
    }
}
