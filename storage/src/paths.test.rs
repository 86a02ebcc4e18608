use tempfile::tempdir;

use super::*;

#[test]
fn creates_fresh_layout() {
    let dir = tempdir().unwrap();
    let paths = DataPaths::ensure_initialized(dir.path()).unwrap();
    assert!(paths.root.ends_with("octave-data"));
    assert!(paths.backups_dir().is_dir());
    assert_eq!(paths.conversations_db().file_name().unwrap(), "conversations.db");
}

#[test]
fn copies_legacy_directory_once() {
    let dir = tempdir().unwrap();
    let legacy = dir.path().join("circuit-data");
    std::fs::create_dir_all(&legacy).unwrap();
    std::fs::write(legacy.join("conversations.db"), b"legacy-bytes").unwrap();

    let paths = DataPaths::ensure_initialized(dir.path()).unwrap();
    let copied = paths.conversations_db();
    assert_eq!(std::fs::read(&copied).unwrap(), b"legacy-bytes");
    // Legacy directory is preserved, not moved.
    assert!(legacy.join("conversations.db").exists());
}

#[test]
fn does_not_overwrite_existing_target() {
    let dir = tempdir().unwrap();
    let legacy = dir.path().join("circuit-data");
    std::fs::create_dir_all(&legacy).unwrap();
    std::fs::write(legacy.join("conversations.db"), b"legacy-bytes").unwrap();

    // Pre-create the target with different content.
    let target = dir.path().join("octave-data");
    std::fs::create_dir_all(&target).unwrap();
    std::fs::write(target.join("conversations.db"), b"current-bytes").unwrap();

    let paths = DataPaths::ensure_initialized(dir.path()).unwrap();
    assert_eq!(std::fs::read(paths.conversations_db()).unwrap(), b"current-bytes");
}
