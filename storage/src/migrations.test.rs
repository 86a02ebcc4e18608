use rusqlite::Connection;

use super::*;

#[test]
fn applies_every_migration_from_empty() {
    let mut conn = Connection::open_in_memory().unwrap();
    let applied = run_migrations(&mut conn, MIGRATIONS).unwrap();
    assert_eq!(applied.len(), MIGRATIONS.len());

    let version: i64 = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
        .unwrap();
    assert_eq!(version, MIGRATIONS.last().unwrap().version);
}

#[test]
fn reopen_applies_zero_additional_migrations() {
    let mut conn = Connection::open_in_memory().unwrap();
    run_migrations(&mut conn, MIGRATIONS).unwrap();
    let second = run_migrations(&mut conn, MIGRATIONS).unwrap();
    assert!(second.is_empty());
}

#[test]
fn memory_migrations_create_project_memories_table() {
    let mut conn = Connection::open_in_memory().unwrap();
    run_migrations(&mut conn, MEMORY_MIGRATIONS).unwrap();
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='project_memories'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn block_type_check_accepts_file_summary_after_migration() {
    let mut conn = Connection::open_in_memory().unwrap();
    run_migrations(&mut conn, MIGRATIONS).unwrap();
    conn.execute(
        "INSERT INTO conversations (id, workspace_id, title, created_at, updated_at, active) \
         VALUES ('c1', 'w1', NULL, '2024', '2024', 1)",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO messages (id, conversation_id, role, content, timestamp) \
         VALUES ('m1', 'c1', 'assistant', 'hi', 0)",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO blocks (id, message_id, block_type, content, metadata, block_order, created_at) \
         VALUES ('b1', 'm1', 'file-summary', '{}', NULL, 9999, '2024')",
        [],
    )
    .unwrap();
}
