//! Conversion between [`Entry`] values and `entries`/`meta` rows.
//!
//! Insertion runs inside the caller's transaction. Reading validates every
//! column and reports anything unexpected as `ArtifactCorrupt`; a row that
//! cannot be decoded is never silently dropped.

use std::collections::HashMap;

use nldoc_core::{DefaultValue, Entry, ValueType};
use rusqlite::{Connection, Row, params};

use crate::error::{Result, StoreError};

const SELECT_ENTRIES: &str = "SELECT name, folded_name, namelist, value_type, dim, ord, \
     default_value, summary, doc, version, origin FROM entries ORDER BY id";

/// Inserts all entries.
pub(crate) fn insert_entries(conn: &Connection, entries: &[Entry]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO entries (name, folded_name, namelist, value_type, dim, ord, \
         default_value, summary, doc, version, origin) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;
    for entry in entries {
        stmt.execute(params![
            entry.name,
            entry.key(),
            entry.namelist,
            entry.value_type.label(),
            entry.dim,
            entry.order,
            entry.default.as_literal(),
            entry.summary,
            entry.doc,
            entry.version.as_str(),
            entry.origin,
        ])?;
    }
    Ok(())
}

/// Writes metadata pairs, replacing existing keys.
pub(crate) fn insert_meta(conn: &Connection, pairs: &[(&str, String)]) -> Result<()> {
    let mut stmt = conn.prepare("INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)")?;
    for (key, value) in pairs {
        stmt.execute(params![key, value])?;
    }
    Ok(())
}

/// Loads the `meta` table.
pub(crate) fn load_meta(conn: &Connection) -> Result<HashMap<String, String>> {
    let mut stmt = conn
        .prepare("SELECT key, value FROM meta")
        .map_err(StoreError::corrupt)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(StoreError::corrupt)?;
    rows.collect::<rusqlite::Result<HashMap<_, _>>>()
        .map_err(StoreError::corrupt)
}

/// Loads every entry in insertion order.
pub(crate) fn load_entries(conn: &Connection) -> Result<Vec<Entry>> {
    let mut stmt = conn.prepare(SELECT_ENTRIES).map_err(StoreError::corrupt)?;
    let mut rows = stmt.query([]).map_err(StoreError::corrupt)?;

    let mut entries = Vec::new();
    while let Some(row) = rows.next().map_err(StoreError::corrupt)? {
        entries.push(row_to_entry(row)?);
    }
    Ok(entries)
}

fn row_to_entry(row: &Row<'_>) -> Result<Entry> {
    let column = |idx: usize| -> Result<String> { row.get(idx).map_err(StoreError::corrupt) };

    let name = column(0)?;
    let folded = column(1)?;
    let value_type = column(3)?;
    let dim: i64 = row.get(4).map_err(StoreError::corrupt)?;
    let order: Option<i64> = row.get(5).map_err(StoreError::corrupt)?;
    let default: Option<String> = row.get(6).map_err(StoreError::corrupt)?;

    let value_type = ValueType::from_label(&value_type)
        .ok_or_else(|| StoreError::corrupt(format!("entry `{name}` has unknown value type `{value_type}`")))?;
    let dim = u8::try_from(dim)
        .map_err(|_| StoreError::corrupt(format!("entry `{name}` has invalid rank {dim}")))?;
    let order = order
        .map(u32::try_from)
        .transpose()
        .map_err(|_| StoreError::corrupt(format!("entry `{name}` has invalid order")))?;

    let mut entry = Entry::new(name, column(9)?.as_str())
        .with_doc(column(8)?)
        .with_summary(column(7)?)
        .with_default(default.map_or(DefaultValue::Unset, DefaultValue::Literal))
        .with_value_type(value_type)
        .with_namelist(column(2)?)
        .with_origin(column(10)?);
    entry.dim = dim;
    entry.order = order;

    if entry.key() != folded {
        return Err(StoreError::corrupt(format!(
            "entry `{}` is stored under folded name `{folded}`",
            entry.name
        )));
    }
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use crate::schema::SCHEMA_SQL;

    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        conn
    }

    #[test]
    fn test_unset_and_empty_defaults_stay_distinct() {
        let conn = conn();
        let entries = vec![
            Entry::new("a", "1"),
            Entry::new("b", "1").with_default(DefaultValue::literal("")),
        ];
        insert_entries(&conn, &entries).unwrap();
        let loaded = load_entries(&conn).unwrap();
        assert_eq!(loaded[0].default, DefaultValue::Unset);
        assert_eq!(loaded[1].default, DefaultValue::literal(""));
    }

    #[test]
    fn test_all_fields_survive() {
        let conn = conn();
        let mut entry = Entry::new("x_ctrl", "r24.03.1")
            .with_doc("Extra controls.\n\nSecond paragraph.")
            .with_summary("Custom summary.")
            .with_default(DefaultValue::literal("0d0"))
            .with_value_type(ValueType::Real)
            .with_namelist("controls")
            .with_origin("controls.defaults");
        entry.dim = 1;
        entry.order = Some(7);
        insert_entries(&conn, std::slice::from_ref(&entry)).unwrap();
        assert_eq!(load_entries(&conn).unwrap(), vec![entry]);
    }

    #[test]
    fn test_unknown_value_type_is_corrupt() {
        let conn = conn();
        conn.execute(
            "INSERT INTO entries (name, folded_name, value_type, summary, doc, version) \
             VALUES ('a', 'a', 'complex', '', '', '1')",
            [],
        )
        .unwrap();
        assert!(matches!(load_entries(&conn), Err(StoreError::ArtifactCorrupt(_))));
    }

    #[test]
    fn test_mismatched_folded_name_is_corrupt() {
        let conn = conn();
        conn.execute(
            "INSERT INTO entries (name, folded_name, value_type, summary, doc, version) \
             VALUES ('Abc', 'xyz', 'unknown', '', '', '1')",
            [],
        )
        .unwrap();
        assert!(matches!(load_entries(&conn), Err(StoreError::ArtifactCorrupt(_))));
    }

    #[test]
    fn test_meta_roundtrip() {
        let conn = conn();
        insert_meta(&conn, &[("source_version", "15140".to_string())]).unwrap();
        insert_meta(&conn, &[("source_version", "15141".to_string())]).unwrap();
        let meta = load_meta(&conn).unwrap();
        assert_eq!(meta["source_version"], "15141");
    }
}
