//! Tests for scoped temp files
//!
//! These tests verify:
//! - Temp files are created beside their target
//! - Dropping removes the temp file and leaves the target alone
//! - Persisting replaces the target atomically

use std::io::Write;

use rimedict::io::ScopedTempFile;
use tempfile::TempDir;

#[test]
fn test_temp_file_lives_beside_target() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("dict.bin");

    let temp = ScopedTempFile::beside(&target).unwrap();
    assert_eq!(temp.path().parent(), target.parent());
    assert_ne!(temp.path(), target.as_path());
    assert_eq!(temp.target(), target.as_path());
    assert!(temp.path().exists());
}

#[test]
fn test_temp_file_removed_on_drop() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("dict.bin");

    let temp_path = {
        let mut temp = ScopedTempFile::beside(&target).unwrap();
        temp.as_file_mut().write_all(b"partial").unwrap();
        temp.path().to_path_buf()
    };

    assert!(!temp_path.exists());
    assert!(!target.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_persist_moves_contents_to_target() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("dict.bin");

    let mut temp = ScopedTempFile::beside(&target).unwrap();
    temp.as_file_mut().write_all(b"complete").unwrap();
    let temp_path = temp.path().to_path_buf();
    temp.persist().unwrap();

    assert!(!temp_path.exists());
    assert_eq!(std::fs::read(&target).unwrap(), b"complete");
}

#[test]
fn test_persist_replaces_existing_target() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("dict.bin");
    std::fs::write(&target, b"old contents").unwrap();

    let mut temp = ScopedTempFile::beside(&target).unwrap();
    temp.as_file_mut().write_all(b"new").unwrap();
    temp.persist().unwrap();

    assert_eq!(std::fs::read(&target).unwrap(), b"new");
}

#[test]
fn test_failed_save_leaves_target_untouched() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("dict.bin");
    std::fs::write(&target, b"original").unwrap();

    {
        let mut temp = ScopedTempFile::beside(&target).unwrap();
        temp.as_file_mut().write_all(b"abandoned").unwrap();
    }

    assert_eq!(std::fs::read(&target).unwrap(), b"original");
}

#[test]
fn test_missing_directory_is_io_error() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("no-such-dir").join("dict.bin");
    let err = ScopedTempFile::beside(&target).unwrap_err();
    assert_eq!(err.kind(), rimedict::ErrorKind::Io);
}
