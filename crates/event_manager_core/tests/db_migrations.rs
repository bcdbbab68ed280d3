use event_manager_core::db::migrations::latest_version;
use event_manager_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "events");
    assert_table_exists(&conn, "categories");
    assert_table_exists(&conn, "event_categories");
    assert_table_exists(&conn, "attendees");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "attendees");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

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
fn foreign_keys_are_enforced() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO attendees (event_uuid, name, email) VALUES ('missing', 'Asha', 'asha@example.com');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn malformed_event_date_is_rejected_by_schema() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO events (uuid, title, event_date) VALUES ('a', 'Fair', '15/04/2026');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn signed_year_event_date_is_rejected_by_schema() {
    let conn = open_db_in_memory().unwrap();
    for date in ["-999-01-01", "+999-01-01"] {
        let result = conn.execute(
            "INSERT INTO events (uuid, title, event_date) VALUES (?1, 'Fair', ?2);",
            [date, date],
        );
        assert!(result.is_err(), "{date} should be rejected");
    }
}

#[test]
fn blank_attendee_name_is_rejected_by_schema() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO events (uuid, title, status) VALUES ('fair', 'Fair', 'publish');",
        [],
    )
    .unwrap();

    let blank = conn.execute(
        "INSERT INTO attendees (event_uuid, name, email) VALUES ('fair', '   ', 'asha@example.com');",
        [],
    );
    assert!(blank.is_err());

    conn.execute(
        "INSERT INTO attendees (event_uuid, name, email) VALUES ('fair', 'Asha', 'asha@example.com');",
        [],
    )
    .unwrap();
}

#[test]
fn category_cannot_be_its_own_parent() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO categories (id, slug, label, parent_id) VALUES (1, 'music', 'Music', 1);",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn deleting_event_cascades_to_attendees_and_assignments() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO events (uuid, title, status) VALUES ('fair', 'Fair', 'publish');
         INSERT INTO categories (slug, label) VALUES ('music', 'Music');
         INSERT INTO event_categories (event_uuid, category_id) VALUES ('fair', 1);
         INSERT INTO attendees (event_uuid, name, email) VALUES ('fair', 'Asha', 'asha@example.com');
         DELETE FROM events WHERE uuid = 'fair';",
    )
    .unwrap();

    assert_eq!(row_count(&conn, "attendees"), 0);
    assert_eq!(row_count(&conn, "event_categories"), 0);
    assert_eq!(row_count(&conn, "categories"), 1);
}

fn row_count(conn: &Connection, table_name: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table_name};"), [], |row| row.get(0))
        .unwrap()
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
