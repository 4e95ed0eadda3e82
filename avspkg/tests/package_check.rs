//! Integration tests for package validation on a real filesystem.
//!
//! Run with: `cargo test --test package_check`

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use avspkg::checksum::{parse_registry, REGISTRY_FILE_NAME};
use avspkg::error::{Error, IntegrityError, StructuralError};
use avspkg::package::{PackageHandler, PackageStatus};
use avspkg::storage::OsStorage;
use avspkg::ErrorKind;

// ============================================================================
// Helper Functions
// ============================================================================

/// Lay out a package like the mock AVS repository.
fn stage_package(root: &Path) {
    let pkg = root.join("pkg");
    fs::create_dir_all(pkg.join("option-returner")).unwrap();
    fs::write(
        pkg.join("manifest.yml"),
        "version: v0.1.0\nname: mock-avs\nprofiles:\n  - option-returner\n",
    )
    .unwrap();
    fs::write(
        pkg.join("option-returner").join("profile.yml"),
        "options:\n  - name: main-container-name\n",
    )
    .unwrap();
    fs::write(
        pkg.join("option-returner").join("docker-compose.yml"),
        "services:\n  main-service:\n    image: mock-avs:v0.1.0\n",
    )
    .unwrap();
}

fn staged_with_registry() -> (TempDir, PackageHandler) {
    let temp = TempDir::new().unwrap();
    stage_package(temp.path());
    let handler = PackageHandler::new(temp.path());
    handler.write_registry(&OsStorage::new()).unwrap();
    (temp, handler)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_valid_package_is_verified() {
    let (_temp, handler) = staged_with_registry();

    let status = handler.check(&OsStorage::new()).unwrap();

    assert_eq!(status, PackageStatus::Verified { files: 3 });
}

#[test]
fn test_generated_registry_lists_pkg_files() {
    let (temp, _handler) = staged_with_registry();

    let text = fs::read_to_string(temp.path().join(REGISTRY_FILE_NAME)).unwrap();
    let entries = parse_registry(&text).unwrap();
    let paths: Vec<String> = entries
        .iter()
        .map(|e| e.path.to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(
        paths,
        vec![
            "pkg/manifest.yml",
            "pkg/option-returner/docker-compose.yml",
            "pkg/option-returner/profile.yml",
        ]
    );
}

#[test]
fn test_package_without_registry_is_unverified() {
    let temp = TempDir::new().unwrap();
    stage_package(temp.path());

    let status = PackageHandler::new(temp.path())
        .check(&OsStorage::new())
        .unwrap();

    assert_eq!(status, PackageStatus::Unverified);
}

#[test]
fn test_missing_pkg_dir_is_structural() {
    let temp = TempDir::new().unwrap();

    let err = PackageHandler::new(temp.path())
        .check(&OsStorage::new())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Structural(StructuralError::MissingPath { .. })
    ));
}

#[test]
fn test_modified_file_is_integrity_error() {
    let (temp, handler) = staged_with_registry();
    fs::write(temp.path().join("pkg").join("manifest.yml"), "tampered").unwrap();

    let err = handler.check(&OsStorage::new()).unwrap_err();

    match err {
        Error::Integrity(IntegrityError::ChecksumMismatch { path, .. }) => {
            assert_eq!(path, Path::new("pkg").join("manifest.yml"))
        }
        other => panic!("Expected ChecksumMismatch, got {:?}", other),
    }
}

#[test]
fn test_deleted_file_is_integrity_error() {
    let (temp, handler) = staged_with_registry();
    fs::remove_file(
        temp.path()
            .join("pkg")
            .join("option-returner")
            .join("profile.yml"),
    )
    .unwrap();

    let err = handler.check(&OsStorage::new()).unwrap_err();

    assert!(matches!(
        err,
        Error::Integrity(IntegrityError::MissingFile { .. })
    ));
}

#[test]
fn test_malformed_registry_is_format_error() {
    let (temp, handler) = staged_with_registry();
    fs::write(
        temp.path().join(REGISTRY_FILE_NAME),
        "not-a-digest pkg/manifest.yml\n",
    )
    .unwrap();

    let err = handler.check(&OsStorage::new()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_check_is_repeatable() {
    let (_temp, handler) = staged_with_registry();
    let storage = OsStorage::new();

    let first = handler.check(&storage).unwrap();
    let second = handler.check(&storage).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_skip_checksums_ignores_tampering() {
    let (temp, handler) = staged_with_registry();
    fs::write(temp.path().join("pkg").join("manifest.yml"), "tampered").unwrap();

    let status = handler
        .with_verify_checksums(false)
        .check(&OsStorage::new())
        .unwrap();

    assert_eq!(status, PackageStatus::Unverified);
}

#[test]
fn test_registry_with_spaces_in_paths_round_trips() {
    let temp = TempDir::new().unwrap();
    stage_package(temp.path());
    let spaced = temp.path().join("pkg").join("my profile");
    fs::create_dir_all(&spaced).unwrap();
    fs::write(spaced.join("compose.yml"), "services: {}\n").unwrap();

    let storage = OsStorage::new();
    let handler = PackageHandler::new(temp.path());
    handler.write_registry(&storage).unwrap();

    let status = handler.check(&storage).unwrap();
    assert_eq!(status, PackageStatus::Verified { files: 4 });
}
