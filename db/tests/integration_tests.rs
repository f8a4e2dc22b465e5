//! Integration tests for the nldoc-db crate: build, publish, load, query.

use std::fs;
use std::path::PathBuf;

use nldoc_core::{NO_DEFAULT_MARKER, QueryEngine, QueryError};
use nldoc_db::{BuildConfig, DatabaseBuilder, DatabaseError, load};
use nldoc_extract::{SourceDocument, SourceSet, WarningKind};
use nldoc_sqlite::StoreError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn mesa_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../extract/tests/fixtures/mesa")
}

fn text_set(version: &str, label: &str, defaults: &str) -> SourceSet {
    SourceSet::new("controls", version).with_document(SourceDocument::defaults_text(label, defaults))
}

fn foo_set() -> SourceSet {
    text_set("v1", "foo.defaults", "! ### FOO\n! controls foo\nFOO = 0\n")
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_single_entry_build_and_query() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesa.db");
    DatabaseBuilder::new()
        .with_source_set(foo_set())
        .with_output(&path)
        .build()
        .unwrap();

    let db = load(&path).unwrap();
    let query = QueryEngine::new(&db);
    assert_eq!(query.doc("foo").unwrap(), "controls foo");
    assert_eq!(query.default("FOO").unwrap(), "0");
    assert_eq!(query.search_namelist_name(&["oo"]).unwrap(), vec!["FOO"]);
    assert!(query.search_namelist_name(&["zzz"]).unwrap().is_empty());
    assert_eq!(query.doc("BAR"), Err(QueryError::NotFound("BAR".to_string())));
    assert_eq!(query.version().source.as_str(), "v1");
}

#[test]
fn test_case_variant_duplicates_keep_newest_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesa.db");
    let report = DatabaseBuilder::new()
        .with_source_set(text_set("v1", "old.defaults", "! ### Baz\n! old baz\nBaz = 1\n"))
        .with_source_set(text_set("v2", "new.defaults", "! ### BAZ\n! new baz\nBAZ = 2\n"))
        .with_output(&path)
        .build()
        .unwrap();

    assert_eq!(report.entries, 1);
    assert_eq!(report.superseded, 1);
    let superseded: Vec<_> = report
        .warnings
        .iter()
        .filter(|w| w.kind == WarningKind::Superseded)
        .collect();
    assert_eq!(superseded.len(), 1);
    assert_eq!(superseded[0].origin, "old.defaults");

    let db = load(&path).unwrap();
    assert_eq!(db.len(), 1);
    let entry = db.get("baz").unwrap();
    assert_eq!(entry.name, "BAZ");
    assert_eq!(entry.doc, "new baz");
    assert_eq!(entry.version.as_str(), "v2");
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn test_roundtrip_matches_in_memory_answers() {
    let dir = tempfile::tempdir().unwrap();
    let config = BuildConfig {
        artifact: Some(dir.path().join("mesa.db")),
        ..BuildConfig::for_root(mesa_fixture())
    };
    let builder = DatabaseBuilder::from_config(&config).unwrap();
    let (memory, _) = builder.build_in_memory().unwrap();
    builder.build().unwrap();
    let loaded = load(config.artifact_path().unwrap()).unwrap();

    let (a, b) = (QueryEngine::new(&memory), QueryEngine::new(&loaded));
    for entry in memory.entries() {
        let name = entry.name.as_str();
        assert_eq!(a.doc(name), b.doc(name));
        assert_eq!(a.default(name), b.default(name));
        assert_eq!(a.summary(name), b.summary(name));
    }
    assert_eq!(a.version(), b.version());
    assert_eq!(memory.entries(), loaded.entries());
}

#[test]
fn test_rebuild_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.db");
    let second = dir.path().join("second.db");
    let builder = DatabaseBuilder::from_config(&BuildConfig::for_root(mesa_fixture())).unwrap();

    builder.clone().with_output(&first).build().unwrap();
    builder.with_output(&second).build().unwrap();

    let (a, b) = (load(&first).unwrap(), load(&second).unwrap());
    assert_eq!(a.entries(), b.entries());
    let (qa, qb) = (QueryEngine::new(&a), QueryEngine::new(&b));
    for pattern in ["ctrl", "mass", "_", "pgstar", "zzz"] {
        assert_eq!(qa.search_namelist_name(&[pattern]), qb.search_namelist_name(&[pattern]));
        assert_eq!(qa.search_doc(&[pattern]), qb.search_doc(&[pattern]));
    }
}

#[test]
fn test_names_are_unique_case_insensitively() {
    let builder = DatabaseBuilder::from_config(&BuildConfig::for_root(mesa_fixture())).unwrap();
    let (db, _) = builder.build_in_memory().unwrap();
    let mut keys: Vec<String> = db.entries().iter().map(|e| e.key()).collect();
    let total = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), total);
}

// ---------------------------------------------------------------------------
// MESA layout
// ---------------------------------------------------------------------------

#[test]
fn test_standard_layout_build() {
    let dir = tempfile::tempdir().unwrap();
    let config = BuildConfig {
        artifact: Some(dir.path().join("mesa.db")),
        ..BuildConfig::for_root(mesa_fixture())
    };
    let report = DatabaseBuilder::from_config(&config).unwrap().build().unwrap();

    assert_eq!(report.source_version.as_str(), "15140");
    assert_eq!(report.entries, 18);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.count(WarningKind::MissingValue), 1);

    let db = load(config.artifact_path().unwrap()).unwrap();
    let query = QueryEngine::new(&db);
    assert_eq!(query.default("extra_controls_inlist_name").unwrap(), NO_DEFAULT_MARKER);
    assert_eq!(query.default("history_columns_file").unwrap(), NO_DEFAULT_MARKER);
    assert_eq!(query.summary("initial_mass").unwrap(), "Initial mass in Msun units.");
    assert_eq!(
        query.search_doc(&["pre-main-sequence"]).unwrap(),
        vec!["create_pre_main_sequence_model", "pre_ms_guess_rho_c", "pre_ms_T_c"]
    );
    assert_eq!(
        query.search_name_prefix("grid1"),
        vec!["Grid1_win_flag", "Grid1_win_width"]
    );
}

#[test]
fn test_yaml_config_drives_build() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = format!(
        "source_root: {root}\nversion: '12345'\nartifact: {out}\nnamelists:\n  - name: pgstar\n    defaults: [star/defaults/pgstar.defaults]\n",
        root = mesa_fixture().display(),
        out = dir.path().join("pg.db").display(),
    );
    let config_path = dir.path().join("nldoc.yml");
    fs::write(&config_path, yaml).unwrap();

    let config = BuildConfig::load(&config_path).unwrap();
    let report = DatabaseBuilder::from_config(&config).unwrap().build().unwrap();
    assert_eq!(report.entries, 2);
    assert_eq!(report.source_version.as_str(), "12345");
    assert_eq!(report.artifact, Some(dir.path().join("pg.db")));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn test_empty_build_is_rejected_and_keeps_previous_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesa.db");
    DatabaseBuilder::new()
        .with_source_set(foo_set())
        .with_output(&path)
        .build()
        .unwrap();

    let result = DatabaseBuilder::new()
        .with_source_set(text_set("v2", "broken.defaults", "not an assignment\n"))
        .with_output(&path)
        .build();
    assert!(matches!(result, Err(DatabaseError::NoEntriesExtracted)));

    let db = load(&path).unwrap();
    assert_eq!(QueryEngine::new(&db).doc("FOO").unwrap(), "controls foo");
}

#[test]
fn test_backup_previous_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesa.db");
    let builder = DatabaseBuilder::new()
        .with_source_set(foo_set())
        .with_output(&path)
        .with_backup_previous(true);

    let first = builder.build().unwrap();
    assert_eq!(first.backup, None);
    let second = builder.build().unwrap();
    assert_eq!(second.backup, Some(dir.path().join("mesa_old.db")));
    assert!(load(dir.path().join("mesa_old.db")).is_ok());
}

#[test]
fn test_missing_artifact_reports_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = load(dir.path().join("absent.db")).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, DatabaseError::Store(StoreError::ArtifactNotFound(_))));
}

#[test]
fn test_missing_version_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = DatabaseBuilder::from_config(&BuildConfig::for_root(dir.path()));
    assert!(matches!(result, Err(DatabaseError::IoError(_))));
}

#[test]
fn test_report_serializes_to_json() {
    let builder = DatabaseBuilder::new().with_source_set(foo_set());
    let (_, report) = builder.build_in_memory().unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["entries"], 1);
    assert_eq!(json["source_version"], "v1");
    assert!(json.get("artifact").is_none());
}
