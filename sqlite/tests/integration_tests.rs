//! Integration tests for the nldoc-sqlite crate.

use std::fs;

use nldoc_core::{
    DATABASE_SCHEMA_VERSION, Database, DefaultValue, Entry, NO_DEFAULT_MARKER, QueryEngine,
    ValueType,
};
use nldoc_sqlite::{StoreError, WriteOptions, backup_path, read_artifact, write_artifact};
use rusqlite::Connection;

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn sample_db() -> Database {
    let mut x_ctrl = Entry::new("x_ctrl", "15140")
        .with_doc("Extra real controls for run_star_extras.")
        .with_default(DefaultValue::literal("0d0"))
        .with_value_type(ValueType::Real)
        .with_namelist("controls")
        .with_origin("star/defaults/controls.defaults");
    x_ctrl.dim = 1;
    x_ctrl.order = Some(3);

    Database::from_entries(
        vec![
            Entry::new("FOO", "15140")
                .with_doc("Controls foo.\n\nLonger discussion of foo.")
                .with_default(DefaultValue::literal("0"))
                .with_value_type(ValueType::Integer)
                .with_namelist("controls"),
            Entry::new("extra_file", "15140").with_value_type(ValueType::Character),
            Entry::new("empty_string_default", "15140").with_default(DefaultValue::literal("''")),
            x_ctrl,
        ],
        now(),
    )
    .unwrap()
}

#[test]
fn test_roundtrip_is_lossless() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesa.db");
    let db = sample_db();

    let published = write_artifact(&path, &db, &WriteOptions::default()).unwrap();
    assert_eq!(published.path, path);
    assert_eq!(published.backup, None);

    let loaded = read_artifact(&path).unwrap();
    assert_eq!(loaded, db);

    let query = QueryEngine::new(&loaded);
    assert_eq!(query.default("foo").unwrap(), "0");
    assert_eq!(query.default("EXTRA_FILE").unwrap(), NO_DEFAULT_MARKER);
    assert_eq!(query.version().schema, DATABASE_SCHEMA_VERSION);
    assert_eq!(loaded.get("x_ctrl").unwrap().dim, 1);
}

#[test]
fn test_missing_artifact_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.db");
    match read_artifact(&path) {
        Err(StoreError::ArtifactNotFound(p)) => assert_eq!(p, path),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn test_garbage_file_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesa.db");
    fs::write(&path, b"not a sqlite database. ".repeat(32)).unwrap();
    assert!(matches!(read_artifact(&path), Err(StoreError::ArtifactCorrupt(_))));
}

#[test]
fn test_empty_file_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesa.db");
    fs::write(&path, b"").unwrap();
    assert!(matches!(read_artifact(&path), Err(StoreError::ArtifactCorrupt(_))));
}

#[test]
fn test_incompatible_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesa.db");
    write_artifact(&path, &sample_db(), &WriteOptions::default()).unwrap();

    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("DROP TABLE entries; PRAGMA user_version = 2;").unwrap();
    }

    match read_artifact(&path) {
        Err(StoreError::ArtifactIncompatible { found, supported }) => {
            assert_eq!(found, 2);
            assert_eq!(supported, DATABASE_SCHEMA_VERSION);
        }
        other => panic!("expected incompatible, got {other:?}"),
    }
}

#[test]
fn test_tampered_row_fails_checksum() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesa.db");
    write_artifact(&path, &sample_db(), &WriteOptions::default()).unwrap();

    {
        let conn = Connection::open(&path).unwrap();
        conn.execute("UPDATE entries SET doc = 'tampered' WHERE folded_name = 'foo'", [])
            .unwrap();
    }

    let err = read_artifact(&path).unwrap_err();
    assert!(matches!(err, StoreError::ArtifactCorrupt(ref reason) if reason.contains("checksum")));
}

#[test]
fn test_deleted_row_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesa.db");
    write_artifact(&path, &sample_db(), &WriteOptions::default()).unwrap();

    {
        let conn = Connection::open(&path).unwrap();
        conn.execute("DELETE FROM entries WHERE folded_name = 'extra_file'", [])
            .unwrap();
    }

    assert!(matches!(read_artifact(&path), Err(StoreError::ArtifactCorrupt(_))));
}

#[test]
fn test_replace_keeps_single_file_and_backs_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesa.db");
    let first = sample_db();
    write_artifact(&path, &first, &WriteOptions::default()).unwrap();

    let second = Database::from_entries(vec![Entry::new("only", "15141")], now()).unwrap();
    let published = write_artifact(
        &path,
        &second,
        &WriteOptions {
            backup_previous: true,
        },
    )
    .unwrap();

    let backup = backup_path(&path);
    assert_eq!(published.backup.as_deref(), Some(backup.as_path()));
    assert_eq!(read_artifact(&path).unwrap(), second);
    assert_eq!(read_artifact(&backup).unwrap(), first);

    // No temporary files are left behind.
    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["mesa.db", "mesa_old.db"]);
}

#[test]
fn test_write_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("nested").join("mesa.db");
    write_artifact(&path, &sample_db(), &WriteOptions::default()).unwrap();
    assert!(path.is_file());
}

#[test]
fn test_failed_write_leaves_previous_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesa.db");
    let db = sample_db();
    write_artifact(&path, &db, &WriteOptions::default()).unwrap();

    // A directory in place of the destination makes the final rename fail.
    let blocked = dir.path().join("blocked.db");
    fs::create_dir(&blocked).unwrap();
    fs::write(blocked.join("keep"), b"x").unwrap();
    assert!(write_artifact(&blocked, &db, &WriteOptions::default()).is_err());

    assert_eq!(read_artifact(&path).unwrap(), db);
    let leftovers = fs::read_dir(dir.path())
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .ends_with(".tmp")
        })
        .count();
    assert_eq!(leftovers, 0);
}
