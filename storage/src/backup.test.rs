use tempfile::tempdir;

use super::*;
use crate::db::Db;

#[test]
fn create_backup_writes_a_file_under_backups() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    db.create_conversation("w1", None).unwrap();

    let backup = db.create_backup().unwrap();
    assert!(backup.path.exists());
    assert!(backup.path.starts_with(db.paths.backups_dir()));
}

#[test]
fn list_backups_returns_created_files() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    db.create_backup().unwrap();
    db.create_backup().unwrap();

    let backups = db.list_backups().unwrap();
    assert_eq!(backups.len(), 2);
}
