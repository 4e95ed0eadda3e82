//! Parsing, serialization and verification of `checksum.txt` registries.

use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::digest::{digest_reader, DIGEST_HEX_LEN};
use crate::error::{Error, FormatError, IntegrityError, Result};
use crate::storage::{walk_files, Storage};

/// File name of the registry, relative to the package root.
pub const REGISTRY_FILE_NAME: &str = "checksum.txt";

/// One tracked file of a checksum registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumEntry {
    /// Path of the tracked file, relative to the package root.
    pub path: PathBuf,

    /// Lowercase hex digest of the file contents.
    pub digest: String,
}

impl ChecksumEntry {
    /// Create a new entry. The digest is normalized to lowercase.
    pub fn new(path: impl Into<PathBuf>, digest: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            digest: digest.into().to_ascii_lowercase(),
        }
    }

    /// Path with `/` separators, as written to the registry.
    fn registry_path(&self) -> String {
        self.path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for ChecksumEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.digest, self.registry_path())
    }
}

fn line_error(line: usize, reason: impl Into<String>) -> Error {
    FormatError::ChecksumLine {
        line,
        reason: reason.into(),
    }
    .into()
}

/// Validate a registry path and strip any leading `./` components.
///
/// Paths must stay inside the package root: absolute paths and `..`
/// components are rejected.
fn normalize_registry_path(raw: &str) -> std::result::Result<PathBuf, String> {
    let mut normalized = PathBuf::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => return Err(format!("path {raw:?} escapes the package root")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(format!("path {raw:?} is not relative"))
            }
        }
    }
    if normalized.as_os_str().is_empty() {
        return Err(format!("path {raw:?} is empty"));
    }
    Ok(normalized)
}

/// Parse the text of a checksum registry.
///
/// Blank lines are ignored. Every other line must be
/// `"<hex-digest><whitespace><relative-path>"`, where the path runs to the end
/// of the line and may contain spaces. A single malformed line
/// rejects the whole registry.
///
/// # Example
///
/// ```
/// use avspkg::checksum::parse_registry;
///
/// let text = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855  pkg/manifest.yml\n";
/// let entries = parse_registry(text).unwrap();
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].path.to_str(), Some("pkg/manifest.yml"));
///
/// assert!(parse_registry("not-a-digest  pkg/manifest.yml").is_err());
/// ```
pub fn parse_registry(text: &str) -> Result<Vec<ChecksumEntry>> {
    let mut entries = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        // The path is everything after the separator run, so it may contain spaces.
        let Some((digest, rest)) = line.trim_start().split_once(char::is_whitespace) else {
            return Err(line_error(line_number, "expected a digest and a path".to_string()));
        };
        let raw_path = rest.trim_start();
        if raw_path.is_empty() {
            return Err(line_error(line_number, "missing path".to_string()));
        }

        if digest.len() != DIGEST_HEX_LEN || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(line_error(
                line_number,
                format!("{digest:?} is not a {DIGEST_HEX_LEN}-character hex digest"),
            ));
        }

        let path = normalize_registry_path(raw_path)
            .map_err(|reason| line_error(line_number, reason))?;
        entries.push(ChecksumEntry::new(path, digest));
    }

    Ok(entries)
}

/// Serialize entries to registry text, one newline-terminated line each.
pub fn serialize_registry(entries: &[ChecksumEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{entry}\n"))
        .collect()
}

/// Load and parse the registry of the package at `root`.
///
/// Returns `Ok(None)` only when the registry file does not exist. Any other
/// read failure is returned as an error.
pub fn load_registry(storage: &dyn Storage, root: &Path) -> Result<Option<Vec<ChecksumEntry>>> {
    let path = root.join(REGISTRY_FILE_NAME);
    let bytes = match storage.read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No checksum registry present");
            return Ok(None);
        }
        Err(e) => return Err(Error::io(path, e)),
    };

    let text = String::from_utf8(bytes).map_err(|e| {
        Error::io(
            path.clone(),
            io::Error::new(io::ErrorKind::InvalidData, e.utf8_error()),
        )
    })?;

    parse_registry(&text).map(Some)
}

/// Check every entry against the live contents under `root`.
///
/// Entries are checked in order and the first missing or mismatched file
/// determines the error.
pub fn verify_registry(storage: &dyn Storage, root: &Path, entries: &[ChecksumEntry]) -> Result<()> {
    for entry in entries {
        let full_path = root.join(&entry.path);
        let reader = match storage.open(&full_path) {
            Ok(reader) => reader,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(IntegrityError::MissingFile {
                    path: entry.path.clone(),
                    expected: entry.digest.clone(),
                }
                .into())
            }
            Err(e) => return Err(Error::io(full_path, e)),
        };

        let actual = digest_reader(reader).map_err(|e| Error::io(full_path.clone(), e))?;
        if actual != entry.digest {
            return Err(IntegrityError::ChecksumMismatch {
                path: entry.path.clone(),
                expected: entry.digest.clone(),
                actual,
            }
            .into());
        }
    }

    debug!(root = %root.display(), files = entries.len(), "Checksum registry verified");
    Ok(())
}

/// Build a registry for every regular file below `root/subdir`.
///
/// Files are listed in lexical path order, relative to `root`.
pub fn generate_registry(
    storage: &dyn Storage,
    root: &Path,
    subdir: &Path,
) -> Result<Vec<ChecksumEntry>> {
    let base = root.join(subdir);
    let files = walk_files(storage, &base).map_err(|e| Error::io(base.clone(), e))?;

    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let reader = storage.open(&file).map_err(|e| Error::io(file.clone(), e))?;
        let digest = digest_reader(reader).map_err(|e| Error::io(file.clone(), e))?;
        let relative = file.strip_prefix(root).unwrap_or(&file);
        entries.push(ChecksumEntry::new(relative, digest));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::compute_digest;
    use crate::error::ErrorKind;
    use crate::storage::MemoryStorage;

    const EMPTY_DIGEST: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn package_with_files(files: &[(&str, &[u8])]) -> (MemoryStorage, PathBuf, Vec<ChecksumEntry>) {
        let storage = MemoryStorage::new();
        let root = PathBuf::from("/packages/mock-avs");
        let mut entries = Vec::new();
        for (path, data) in files {
            storage.write(&root.join(path), data).unwrap();
            entries.push(ChecksumEntry::new(*path, compute_digest(data)));
        }
        (storage, root, entries)
    }

    #[test]
    fn test_parse_single_line() {
        let text = format!("{EMPTY_DIGEST}  pkg/manifest.yml\n");
        let entries = parse_registry(&text).unwrap();
        assert_eq!(
            entries,
            vec![ChecksumEntry::new("pkg/manifest.yml", EMPTY_DIGEST)]
        );
    }

    #[test]
    fn test_parse_keeps_order_and_skips_blank_lines() {
        let text = format!(
            "{EMPTY_DIGEST}  pkg/b.yml\n\n{EMPTY_DIGEST}  pkg/a.yml\n   \n"
        );
        let entries = parse_registry(&text).unwrap();
        let paths: Vec<_> = entries.iter().map(|e| e.path.to_str().unwrap()).collect();
        assert_eq!(paths, vec!["pkg/b.yml", "pkg/a.yml"]);
    }

    #[test]
    fn test_parse_normalizes_uppercase_digest_and_dot_prefix() {
        let text = format!("{}  ./pkg/manifest.yml", EMPTY_DIGEST.to_uppercase());
        let entries = parse_registry(&text).unwrap();
        assert_eq!(entries[0].digest, EMPTY_DIGEST);
        assert_eq!(entries[0].path, PathBuf::from("pkg/manifest.yml"));
    }

    #[test]
    fn test_parse_rejects_whole_file_on_one_bad_line() {
        let text = format!(
            "{EMPTY_DIGEST}  pkg/a.yml\nzz{}  pkg/b.yml\n{EMPTY_DIGEST}  pkg/c.yml\n",
            &EMPTY_DIGEST[2..]
        );
        let err = parse_registry(&text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        match err {
            Error::Format(FormatError::ChecksumLine { line, .. }) => assert_eq!(line, 2),
            other => panic!("Expected ChecksumLine error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_missing_path() {
        assert!(parse_registry(EMPTY_DIGEST).is_err());
        assert!(parse_registry(&format!("{EMPTY_DIGEST}   ")).is_err());
    }

    #[test]
    fn test_parse_path_with_spaces() {
        let text = format!("{EMPTY_DIGEST}  pkg/my profile/compose file.yml\n");
        let entries = parse_registry(&text).unwrap();
        assert_eq!(
            entries[0].path,
            PathBuf::from("pkg/my profile/compose file.yml")
        );
    }

    #[test]
    fn test_generated_registry_with_spaces_verifies() {
        let storage = MemoryStorage::new();
        let root = PathBuf::from("/packages/mock-avs");
        storage
            .write(&root.join("pkg/manifest.yml"), b"version: v0.1.0")
            .unwrap();
        storage
            .write(&root.join("pkg/my profile/compose.yml"), b"services: {}")
            .unwrap();

        let entries = generate_registry(&storage, &root, Path::new("pkg")).unwrap();
        let parsed = parse_registry(&serialize_registry(&entries)).unwrap();

        assert_eq!(parsed, entries);
        verify_registry(&storage, &root, &parsed).unwrap();
    }

    #[test]
    fn test_parse_rejects_short_digest() {
        assert!(parse_registry("abc123  pkg/a.yml").is_err());
    }

    #[test]
    fn test_parse_rejects_escaping_paths() {
        assert!(parse_registry(&format!("{EMPTY_DIGEST}  ../outside")).is_err());
        assert!(parse_registry(&format!("{EMPTY_DIGEST}  /etc/passwd")).is_err());
        assert!(parse_registry(&format!("{EMPTY_DIGEST}  ./")).is_err());
    }

    #[test]
    fn test_serialize_uses_two_spaces() {
        let entries = vec![
            ChecksumEntry::new("pkg/manifest.yml", EMPTY_DIGEST),
            ChecksumEntry::new("pkg/profile/compose.yml", EMPTY_DIGEST),
        ];
        let text = serialize_registry(&entries);
        assert_eq!(
            text,
            format!("{EMPTY_DIGEST}  pkg/manifest.yml\n{EMPTY_DIGEST}  pkg/profile/compose.yml\n")
        );
        assert_eq!(parse_registry(&text).unwrap(), entries);
    }

    #[test]
    fn test_load_registry_absent_is_none() {
        let storage = MemoryStorage::new();
        let result = load_registry(&storage, Path::new("/packages/none")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_registry_propagates_permission_errors() {
        let storage = MemoryStorage::new();
        let root = Path::new("/packages/locked");
        let registry = root.join(REGISTRY_FILE_NAME);
        storage.write(&registry, b"").unwrap();
        storage.deny(registry);

        let err = load_registry(&storage, root).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_load_registry_rejects_invalid_utf8() {
        let storage = MemoryStorage::new();
        let root = Path::new("/packages/binary");
        storage
            .write(&root.join(REGISTRY_FILE_NAME), &[0xff, 0xfe, 0x00])
            .unwrap();

        assert!(load_registry(&storage, root).is_err());
    }

    #[test]
    fn test_verify_unmodified_files() {
        let (storage, root, entries) = package_with_files(&[
            ("pkg/manifest.yml", b"name: mock-avs"),
            ("pkg/profile/compose.yml", b"services: {}"),
        ]);
        verify_registry(&storage, &root, &entries).unwrap();
    }

    #[test]
    fn test_verify_missing_file() {
        let (storage, root, entries) = package_with_files(&[("pkg/manifest.yml", b"name: mock-avs")]);
        storage.remove_file(&root.join("pkg/manifest.yml")).unwrap();

        let err = verify_registry(&storage, &root, &entries).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Integrity);
        assert!(matches!(
            err,
            Error::Integrity(IntegrityError::MissingFile { .. })
        ));
    }

    #[test]
    fn test_verify_modified_file() {
        let (storage, root, entries) = package_with_files(&[("pkg/manifest.yml", b"name: mock-avs")]);
        storage
            .write(&root.join("pkg/manifest.yml"), b"name: mock-avs\n")
            .unwrap();

        let err = verify_registry(&storage, &root, &entries).unwrap_err();
        match err {
            Error::Integrity(IntegrityError::ChecksumMismatch {
                path,
                expected,
                actual,
            }) => {
                assert_eq!(path, PathBuf::from("pkg/manifest.yml"));
                assert_eq!(expected, compute_digest(b"name: mock-avs"));
                assert_eq!(actual, compute_digest(b"name: mock-avs\n"));
            }
            other => panic!("Expected ChecksumMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_reports_first_failure() {
        let (storage, root, entries) = package_with_files(&[
            ("pkg/a.yml", b"a"),
            ("pkg/b.yml", b"b"),
        ]);
        storage.write(&root.join("pkg/a.yml"), b"changed").unwrap();
        storage.remove_file(&root.join("pkg/b.yml")).unwrap();

        let err = verify_registry(&storage, &root, &entries).unwrap_err();
        match err {
            Error::Integrity(e) => assert_eq!(e.path(), Path::new("pkg/a.yml")),
            other => panic!("Expected integrity error, got {:?}", other),
        }
    }

    #[test]
    fn test_generate_registry_walks_in_order() {
        let (storage, root, _) = package_with_files(&[
            ("pkg/profile/compose.yml", b"services: {}"),
            ("pkg/manifest.yml", b"name: mock-avs"),
            ("README.md", b"not tracked"),
        ]);

        let entries = generate_registry(&storage, &root, Path::new("pkg")).unwrap();
        let paths: Vec<_> = entries.iter().map(|e| e.path.to_str().unwrap()).collect();
        assert_eq!(paths, vec!["pkg/manifest.yml", "pkg/profile/compose.yml"]);
        verify_registry(&storage, &root, &entries).unwrap();
    }
}
