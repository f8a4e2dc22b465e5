//! SQL layout of the persisted artifact.
//!
//! # Table structure
//!
//! - `entries`: one row per parameter; `default_value` is `NULL` when the
//!   parameter has no default, which keeps it distinct from an empty literal.
//! - `meta`: key/value database metadata (`source_version`, `generated_at`,
//!   `entry_count`, `content_hash`).
//!
//! The layout version is stored in SQLite's `PRAGMA user_version` so it can
//! be read before any table is touched.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

pub(crate) const META_SOURCE_VERSION: &str = "source_version";
pub(crate) const META_GENERATED_AT: &str = "generated_at";
pub(crate) const META_ENTRY_COUNT: &str = "entry_count";
pub(crate) const META_CONTENT_HASH: &str = "content_hash";

/// Required tables, checked on load.
pub(crate) const TABLES: [&str; 2] = ["entries", "meta"];

/// `CREATE` statements for the artifact layout.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    folded_name TEXT NOT NULL UNIQUE,
    namelist TEXT NOT NULL DEFAULT '',
    value_type TEXT NOT NULL,
    dim INTEGER NOT NULL DEFAULT 0,
    ord INTEGER,
    default_value TEXT,
    summary TEXT NOT NULL,
    doc TEXT NOT NULL,
    version TEXT NOT NULL,
    origin TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Reads `PRAGMA user_version`.
pub(crate) fn user_version(conn: &Connection) -> Result<u32> {
    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(StoreError::corrupt)?;
    u32::try_from(version).map_err(|_| StoreError::corrupt(format!("invalid schema version {version}")))
}

/// Fails with `ArtifactCorrupt` if a required table is missing.
pub(crate) fn check_tables(conn: &Connection) -> Result<()> {
    for table in TABLES {
        let found: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .map_err(StoreError::corrupt)?;
        if found == 0 {
            return Err(StoreError::corrupt(format!("missing table `{table}`")));
        }
    }
    Ok(())
}
