//! Core entry types, merge policy and query engine for namelist
//! documentation databases.
//!
//! This crate defines the foundational types shared by every other crate in
//! the workspace:
//!
//! - [`Entry`] is one documented parameter (name, summary, doc, default,
//!   source version, plus namelist/type/rank metadata).
//! - [`DefaultValue`] is a literal default or the explicit "no default"
//!   marker.
//! - [`SourceVersion`] is a naturally ordered source release identifier.
//! - [`Database`] is an immutable, fully indexed collection of entries.
//! - [`QueryEngine`] is exact and substring queries over a [`Database`].
//!
//! Merging ([`merge_entries`]) resolves duplicate names under a
//! [`MergePolicy`]; validation ([`validate_entry`], [`validate_entries`])
//! enforces the invariants a [`Database`] relies on.
//!
//! # Example
//!
//! ```
//! use nldoc_core::*;
//!
//! let candidates = vec![
//!     Entry::new("Baz", "v1").with_doc("old text"),
//!     Entry::new("BAZ", "v2").with_doc("new text"),
//! ];
//! let merged = merge_entries(candidates, MergePolicy::VersionThenRecency);
//! assert_eq!(merged.overrides.len(), 1);
//!
//! let db = Database::from_entries(merged.entries, "2024-01-01T00:00:00Z").unwrap();
//! let query = QueryEngine::new(&db);
//! assert_eq!(query.doc("baz").unwrap(), "new text");
//! assert_eq!(query.version().source.as_str(), "v2");
//! ```

mod database;
mod index;
mod merge;
mod query;
mod types;
mod validate;

pub use database::{Database, DatabaseInfo};
pub use merge::{MergeOutcome, MergePolicy, Override, merge_entries};
pub use query::{DatabaseVersion, QueryEngine, QueryError};
pub use types::*;
pub use validate::{ValidationError, validate_entries, validate_entry};
