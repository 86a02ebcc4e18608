use tempfile::tempdir;

use super::*;
use crate::db::Db;

#[test]
fn reports_zero_on_empty_database() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    let stats = db.get_stats().unwrap();
    assert_eq!(stats.conversation_count, 0);
    assert!(stats.database_bytes > 0, "sqlite writes a header even when empty");
}

#[test]
fn counts_reflect_writes() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    db.create_conversation("w1", None).unwrap();
    db.create_conversation("w1", None).unwrap();

    let stats = db.get_stats().unwrap();
    assert_eq!(stats.conversation_count, 2);
}
