use tempfile::tempdir;

use super::*;
use crate::db::Db;

fn open_db() -> (tempfile::TempDir, Db) {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    (dir, db)
}

#[test]
fn create_conversation_is_active_by_default() {
    let (_dir, db) = open_db();
    let c = db.create_conversation("w1", None).unwrap();
    assert!(c.active);
    assert_eq!(c.workspace_id, "w1");
}

#[test]
fn create_does_not_deactivate_siblings() {
    let (_dir, db) = open_db();
    let c1 = db.create_conversation("w1", None).unwrap();
    let c2 = db.create_conversation("w1", None).unwrap();
    let convs = db.list_conversations("w1").unwrap();
    let c1_row = convs.iter().find(|c| c.id == c1.id).unwrap();
    let c2_row = convs.iter().find(|c| c.id == c2.id).unwrap();
    assert!(c1_row.active);
    assert!(c2_row.active);
}

#[test]
fn set_active_switches_exclusively() {
    let (_dir, db) = open_db();
    let c1 = db.create_conversation("w1", None).unwrap();
    let c2 = db.create_conversation("w1", None).unwrap();

    db.set_active("w1", &c1.id).unwrap();

    let active = db.get_active_conversation("w1").unwrap().unwrap();
    assert_eq!(active.id, c1.id);

    let convs = db.list_conversations("w1").unwrap();
    assert!(convs.iter().find(|c| c.id == c1.id).unwrap().active);
    assert!(!convs.iter().find(|c| c.id == c2.id).unwrap().active);
}

#[test]
fn set_active_unknown_conversation_not_found() {
    let (_dir, db) = open_db();
    db.create_conversation("w1", None).unwrap();
    let err = db.set_active("w1", "missing").unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn touch_updates_timestamp() {
    let (_dir, db) = open_db();
    let c = db.create_conversation("w1", None).unwrap();
    db.touch(&c.id).unwrap();
    let reloaded = db.get_conversation(&c.id).unwrap().unwrap();
    assert!(reloaded.updated_at >= c.updated_at);
}

#[test]
fn delete_conversation_cascades() {
    let (_dir, db) = open_db();
    let c = db.create_conversation("w1", None).unwrap();
    db.delete_conversation(&c.id).unwrap();
    assert!(db.get_conversation(&c.id).unwrap().is_none());
}
