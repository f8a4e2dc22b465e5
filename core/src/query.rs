//! Read-only query operations over a loaded [`Database`].
//!
//! Exact lookups fold the queried name before matching. Searches OR their
//! patterns together, match case-insensitive substrings, and return names
//! in lexicographic order of their case-folded form, without duplicates.
//!
//! # Example
//!
//! ```
//! use nldoc_core::*;
//!
//! let db = Database::from_entries(vec![
//!     Entry::new("FOO", "v1")
//!         .with_doc("controls foo")
//!         .with_default(DefaultValue::literal("0")),
//! ], "2024-01-01T00:00:00Z").unwrap();
//! let query = QueryEngine::new(&db);
//!
//! assert_eq!(query.doc("foo").unwrap(), "controls foo");
//! assert_eq!(query.default("FOO").unwrap(), "0");
//! assert_eq!(query.search_namelist_name(&["oo"]).unwrap(), vec!["FOO"]);
//! assert!(query.search_namelist_name(&["zzz"]).unwrap().is_empty());
//! assert!(matches!(query.doc("BAR"), Err(QueryError::NotFound(_))));
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::{Database, Entry, SourceVersion};

/// Per-call query errors. Neither invalidates the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// No entry has this (case-folded) name.
    #[error("no entry named {0}")]
    NotFound(String),
    /// A search was issued without any pattern.
    #[error("search requires at least one pattern")]
    EmptyQuery,
}

/// Version metadata of a loaded database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseVersion {
    /// Layout version of the artifact.
    pub schema: u32,
    /// Source release.
    pub source: SourceVersion,
}

impl fmt::Display for DatabaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (schema {})", self.source, self.schema)
    }
}

/// Query engine bound to one database.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'db> {
    db: &'db Database,
}

impl<'db> QueryEngine<'db> {
    /// Binds a query engine to `db`.
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }

    /// Returns the whole entry for `name`.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotFound`] if no entry has this name.
    pub fn entry(&self, name: &str) -> Result<&'db Entry, QueryError> {
        self.db
            .slot_of(name)
            .map(|slot| self.db.entry_at(slot))
            .ok_or_else(|| QueryError::NotFound(name.to_string()))
    }

    /// Returns the documentation text for `name`.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotFound`] if no entry has this name.
    pub fn doc(&self, name: &str) -> Result<&'db str, QueryError> {
        self.entry(name).map(|e| e.doc.as_str())
    }

    /// Returns the default value for `name`, or
    /// [`NO_DEFAULT_MARKER`](crate::NO_DEFAULT_MARKER) when it has none.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotFound`] if no entry has this name.
    pub fn default(&self, name: &str) -> Result<String, QueryError> {
        self.entry(name).map(|e| e.default.to_string())
    }

    /// Returns the summary line for `name`.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotFound`] if no entry has this name.
    pub fn summary(&self, name: &str) -> Result<&'db str, QueryError> {
        self.entry(name).map(|e| e.summary.as_str())
    }

    /// Returns the version metadata of the database.
    pub fn version(&self) -> DatabaseVersion {
        let info = self.db.info();
        DatabaseVersion {
            schema: info.schema_version,
            source: info.source_version.clone(),
        }
    }

    /// Names containing any of `patterns`, case-insensitively.
    ///
    /// # Errors
    ///
    /// [`QueryError::EmptyQuery`] if `patterns` is empty.
    pub fn search_namelist_name<S: AsRef<str>>(
        &self,
        patterns: &[S],
    ) -> Result<Vec<&'db str>, QueryError> {
        let index = self.db.name_index();
        self.collect(patterns, |needle, slots| slots.extend(index.containing(needle)))
    }

    /// Names whose summary or documentation contains any of `patterns`,
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// [`QueryError::EmptyQuery`] if `patterns` is empty.
    pub fn search_doc<S: AsRef<str>>(&self, patterns: &[S]) -> Result<Vec<&'db str>, QueryError> {
        let index = self.db.text_index();
        self.collect(patterns, |needle, slots| slots.extend(index.containing(needle)))
    }

    /// Names starting with `prefix`, case-insensitively.
    pub fn search_name_prefix(&self, prefix: &str) -> Vec<&'db str> {
        let folded = prefix.to_lowercase();
        let slots: BTreeSet<usize> = self.db.name_index().with_prefix(&folded).collect();
        slots
            .into_iter()
            .map(|slot| self.db.entry_at(slot).name.as_str())
            .collect()
    }

    fn collect<S, F>(&self, patterns: &[S], mut matcher: F) -> Result<Vec<&'db str>, QueryError>
    where
        S: AsRef<str>,
        F: FnMut(&str, &mut BTreeSet<usize>),
    {
        if patterns.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let mut slots = BTreeSet::new();
        for pattern in patterns {
            let needle = pattern.as_ref().to_lowercase();
            matcher(&needle, &mut slots);
        }

        Ok(slots
            .into_iter()
            .map(|slot| self.db.entry_at(slot).name.as_str())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::{DefaultValue, NO_DEFAULT_MARKER};

    use super::*;

    fn sample() -> Database {
        Database::from_entries(
            vec![
                Entry::new("use_Ledoux_criterion", "15140")
                    .with_doc("If true, use the Ledoux criterion for convection.")
                    .with_default(DefaultValue::literal(".false.")),
                Entry::new("mixing_length_alpha", "15140")
                    .with_doc("Mixing length parameter.\n\nSee the Ledoux discussion above.")
                    .with_default(DefaultValue::literal("2")),
                Entry::new("max_model_number", "15140")
                    .with_doc("Stop after this many models.")
                    .with_default(DefaultValue::literal("-1")),
                Entry::new("extra_terminal_output_file", "15140"),
            ],
            "2024-01-01T00:00:00Z",
        )
        .unwrap()
    }

    #[test]
    fn test_exact_lookups_are_case_insensitive() {
        let db = sample();
        let q = QueryEngine::new(&db);
        assert_eq!(q.default("USE_LEDOUX_CRITERION").unwrap(), ".false.");
        assert_eq!(q.summary("Max_Model_Number").unwrap(), "Stop after this many models.");
        assert_eq!(q.entry("mixing_length_ALPHA").unwrap().name, "mixing_length_alpha");
    }

    #[test]
    fn test_default_of_unset_entry_returns_marker() {
        let db = sample();
        let q = QueryEngine::new(&db);
        assert_eq!(q.default("extra_terminal_output_file").unwrap(), NO_DEFAULT_MARKER);
        assert_eq!(q.doc("extra_terminal_output_file").unwrap(), "");
    }

    #[test]
    fn test_missing_name_is_not_found_and_session_continues() {
        let db = sample();
        let q = QueryEngine::new(&db);
        assert_eq!(q.summary("nope"), Err(QueryError::NotFound("nope".to_string())));
        assert_eq!(q.default("max_model_number").unwrap(), "-1");
    }

    #[test]
    fn test_search_ors_patterns_and_deduplicates() {
        let db = sample();
        let q = QueryEngine::new(&db);
        let names = q.search_namelist_name(&["model", "max", "LEDOUX"]).unwrap();
        assert_eq!(names, vec!["max_model_number", "use_Ledoux_criterion"]);
    }

    #[test]
    fn test_search_doc_matches_summary_and_body() {
        let db = sample();
        let q = QueryEngine::new(&db);
        let names = q.search_doc(&["ledoux"]).unwrap();
        assert_eq!(names, vec!["mixing_length_alpha", "use_Ledoux_criterion"]);
    }

    #[test]
    fn test_results_are_sorted_by_folded_name() {
        let db = sample();
        let q = QueryEngine::new(&db);
        let names = q.search_namelist_name(&["_"]).unwrap();
        let mut sorted = names.clone();
        sorted.sort_by_key(|n| n.to_lowercase());
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_empty_pattern_list_is_usage_error() {
        let db = sample();
        let q = QueryEngine::new(&db);
        let none: [&str; 0] = [];
        assert_eq!(q.search_namelist_name(&none), Err(QueryError::EmptyQuery));
        assert_eq!(q.search_doc(&none), Err(QueryError::EmptyQuery));
    }

    #[test]
    fn test_prefix_search() {
        let db = sample();
        let q = QueryEngine::new(&db);
        assert_eq!(q.search_name_prefix("MIX"), vec!["mixing_length_alpha"]);
        assert!(q.search_name_prefix("zzz").is_empty());
    }

    #[test]
    fn test_version_display() {
        let db = sample();
        let q = QueryEngine::new(&db);
        assert_eq!(q.version().to_string(), "15140 (schema 1)");
    }
}
