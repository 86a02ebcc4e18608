use tempfile::tempdir;

use super::*;
use crate::db::Db;

#[test]
fn upsert_creates_then_updates_in_place() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();

    let created = db
        .upsert_project_memory("/p", MemoryType::Convention, "style", "2-space indent", MemoryPriority::High, 1)
        .unwrap();
    assert_eq!(created.usage_count, 0);

    let updated = db
        .upsert_project_memory("/p", MemoryType::Rule, "style", "4-space indent", MemoryPriority::Low, 2)
        .unwrap();
    assert_eq!(updated.id, created.id, "same (project_path, key) stays one row");
    assert_eq!(updated.value, "4-space indent");
    assert_eq!(updated.memory_type, MemoryType::Rule);

    let memories = db.list_project_memories("/p").unwrap();
    assert_eq!(memories.len(), 1, "at most one row per (project_path, key)");
}

#[test]
fn same_key_different_project_paths_coexist() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    db.upsert_project_memory("/p1", MemoryType::Note, "k", "v1", MemoryPriority::Low, 1)
        .unwrap();
    db.upsert_project_memory("/p2", MemoryType::Note, "k", "v2", MemoryPriority::Low, 1)
        .unwrap();

    assert_eq!(db.get_project_memory("/p1", "k").unwrap().unwrap().value, "v1");
    assert_eq!(db.get_project_memory("/p2", "k").unwrap().unwrap().value, "v2");
}

#[test]
fn record_usage_increments_count() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    let memory = db
        .upsert_project_memory("/p", MemoryType::Note, "k", "v", MemoryPriority::Low, 1)
        .unwrap();

    db.record_memory_usage(&memory.id).unwrap();
    db.record_memory_usage(&memory.id).unwrap();

    let reloaded = db.get_project_memory("/p", "k").unwrap().unwrap();
    assert_eq!(reloaded.usage_count, 2);
}

#[test]
fn delete_removes_memory() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    let memory = db
        .upsert_project_memory("/p", MemoryType::Note, "k", "v", MemoryPriority::Low, 1)
        .unwrap();
    db.delete_project_memory(&memory.id).unwrap();
    assert!(db.get_project_memory("/p", "k").unwrap().is_none());
}
