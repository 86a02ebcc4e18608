use tempfile::tempdir;

use super::*;

#[test]
fn opens_and_applies_all_migrations() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    assert!(db.paths.conversations_db().exists());
    assert!(db.paths.memory_db().exists());
}

#[test]
fn reopen_applies_no_further_migrations() {
    let dir = tempdir().unwrap();
    {
        Db::open(dir.path()).unwrap();
    }
    // A second open must not error and must leave the schema_version table
    // at the same max version (enforced by run_migrations' own test, this
    // just exercises the full open path twice).
    let db = Db::open(dir.path()).unwrap();
    let version: i64 = db
        .conn
        .lock()
        .unwrap()
        .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
        .unwrap();
    assert_eq!(version, crate::migrations::MIGRATIONS.last().unwrap().version);
}

#[test]
fn map_sql_err_classifies_constraint_violation() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE t (id TEXT PRIMARY KEY)").unwrap();
    conn.execute("INSERT INTO t (id) VALUES ('a')", []).unwrap();
    let err = conn
        .execute("INSERT INTO t (id) VALUES ('a')", [])
        .unwrap_err();
    match map_sql_err("insert", err) {
        Error::DbConstraint { .. } => {}
        other => panic!("expected DbConstraint, got {other:?}"),
    }
}
