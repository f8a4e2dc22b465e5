//! Immutable, indexed collection of entries.

use serde::{Deserialize, Serialize};

use crate::index::{ExactIndex, NameIndex, TextIndex};
use crate::{DATABASE_SCHEMA_VERSION, Entry, SourceVersion, ValidationError, sort_by_name, validate_entries};

/// Database-wide metadata.
///
/// `schema_version` describes the persisted layout; `source_version` is the
/// domain release the entries document (the highest entry version).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    /// Layout version of the persisted artifact.
    pub schema_version: u32,
    /// Highest source version among the entries.
    pub source_version: SourceVersion,
    /// ISO-8601 timestamp of the build that produced the database.
    pub generated_at: String,
}

impl DatabaseInfo {
    /// Creates metadata for the current schema version.
    pub fn new(source_version: SourceVersion, generated_at: impl Into<String>) -> Self {
        Self {
            schema_version: DATABASE_SCHEMA_VERSION,
            source_version,
            generated_at: generated_at.into(),
        }
    }
}

/// The queryable documentation database.
///
/// Built once from a validated set of entries; the entries are kept sorted
/// by case-folded name and every index is derived at construction, so a `Database`
/// value is always fully indexed.
///
/// # Examples
///
/// ```
/// use nldoc_core::*;
///
/// let db = Database::from_entries(vec![
///     Entry::new("FOO", "v1").with_doc("controls foo"),
///     Entry::new("bar", "v2"),
/// ], "2024-01-01T00:00:00Z").unwrap();
///
/// assert_eq!(db.len(), 2);
/// assert_eq!(db.get("foo").unwrap().doc, "controls foo");
/// assert_eq!(db.info().source_version, SourceVersion::new("v2"));
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    entries: Vec<Entry>,
    info: DatabaseInfo,
    exact: ExactIndex,
    names: NameIndex,
    text: TextIndex,
}

impl Database {
    /// Builds a database from entries and explicit metadata.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] if any entry is invalid or two
    /// entries share a case-folded name.
    pub fn new(mut entries: Vec<Entry>, info: DatabaseInfo) -> Result<Self, ValidationError> {
        if let Some(first) = validate_entries(&entries).into_iter().next() {
            return Err(first);
        }
        sort_by_name(&mut entries);

        let exact = ExactIndex::new(&entries);
        let names = NameIndex::new(&entries);
        let text = TextIndex::new(&entries);

        Ok(Self {
            entries,
            info,
            exact,
            names,
            text,
        })
    }

    /// Builds a database whose source version is the highest entry version.
    ///
    /// # Errors
    ///
    /// Same as [`Database::new`].
    pub fn from_entries(
        entries: Vec<Entry>,
        generated_at: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let source_version = entries
            .iter()
            .map(|e| &e.version)
            .max()
            .cloned()
            .unwrap_or_default();
        Self::new(entries, DatabaseInfo::new(source_version, generated_at))
    }

    /// Looks up an entry by case-insensitive name.
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.exact.get(name).map(|slot| &self.entries[slot])
    }

    /// All entries, sorted by case-folded name.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Database metadata.
    pub fn info(&self) -> &DatabaseInfo {
        &self.info
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the database has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entry_at(&self, slot: usize) -> &Entry {
        &self.entries[slot]
    }

    pub(crate) fn name_index(&self) -> &NameIndex {
        &self.names
    }

    pub(crate) fn text_index(&self) -> &TextIndex {
        &self.text
    }

    pub(crate) fn slot_of(&self, name: &str) -> Option<usize> {
        self.exact.get(name)
    }
}

impl PartialEq for Database {
    fn eq(&self, other: &Self) -> bool {
        self.info == other.info && self.entries == other.entries
    }
}
