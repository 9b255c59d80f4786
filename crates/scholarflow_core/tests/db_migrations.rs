use scholarflow_core::db::migrations::latest_version;
use scholarflow_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_object_exists(&conn, "table", "applications");
    assert_object_exists(&conn, "index", "idx_applications_deadline");
    assert_object_exists(&conn, "index", "idx_applications_stage");
    assert_object_exists(&conn, "index", "idx_applications_country");
}

#[test]
fn reopening_file_database_keeps_rows_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scholarflow.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO applications (
                id, type, name, organization, country, region,
                application_open, deadline, stage, created_at, updated_at
             ) VALUES ('a', 'admission', 'MSc', 'TU Delft', 'Netherlands', 'Europe',
                       '2024-10-01', '2025-01-15', 'To Apply', 1, 1);",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM applications;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn type_column_rejects_unknown_kinds() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO applications (
            id, type, name, organization, country, region,
            application_open, deadline, stage, created_at, updated_at
         ) VALUES ('b', 'grant', 'X', 'Y', 'Z', 'Europe',
                   '2024-10-01', '2025-01-15', 'To Apply', 1, 1);",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rejected_newer_database_is_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    assert!(open_db(&path).is_err());

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 999);
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*)
             FROM sqlite_master
             WHERE type = 'table' AND name = 'applications';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 0);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_object_exists(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
