//! Duplicate resolution with a configurable merge policy.
//!
//! Sources may define the same parameter more than once (several releases
//! of the MESA sources, or the same name in two namelists).
//! [`merge_entries`] groups candidates by case-folded name and keeps exactly
//! one entry per key, recording every override as an [`Override`].
//!
//! # Example
//!
//! ```
//! use nldoc_core::*;
//!
//! let candidates = vec![
//!     Entry::new("Baz", "v2").with_doc("newer"),
//!     Entry::new("BAZ", "v1").with_doc("older"),
//! ];
//!
//! let outcome = merge_entries(candidates, MergePolicy::VersionThenRecency);
//! assert_eq!(outcome.entries.len(), 1);
//! assert_eq!(outcome.entries[0].doc, "newer");
//! assert_eq!(outcome.overrides.len(), 1);
//! ```

use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;

use serde::{Deserialize, Serialize};

use crate::{Entry, SourceVersion, fold_name, sort_by_name};

/// Rule deciding which of two same-named candidates survives.
///
/// # Examples
///
/// ```
/// use nldoc_core::*;
///
/// let make = || vec![Entry::new("foo", "v2"), Entry::new("FOO", "v1")];
///
/// let kept = |policy| merge_entries(make(), policy).entries[0].version.clone();
/// assert_eq!(kept(MergePolicy::VersionThenRecency), SourceVersion::new("v2"));
/// assert_eq!(kept(MergePolicy::FirstWins), SourceVersion::new("v2"));
/// assert_eq!(kept(MergePolicy::LastWins), SourceVersion::new("v1"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Highest source version wins; ties go to the most recently extracted.
    #[default]
    VersionThenRecency,
    /// The first extracted candidate wins.
    FirstWins,
    /// The most recently extracted candidate wins.
    LastWins,
}

impl MergePolicy {
    /// Returns `true` if `challenger` (extracted later) replaces `incumbent`.
    fn replaces(self, incumbent: &Entry, challenger: &Entry) -> bool {
        match self {
            Self::VersionThenRecency => challenger.version >= incumbent.version,
            Self::FirstWins => false,
            Self::LastWins => true,
        }
    }
}

/// One resolved duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Override {
    /// Name of the surviving entry.
    pub name: String,
    /// Version of the surviving entry.
    pub kept_version: SourceVersion,
    /// Origin of the surviving entry.
    pub kept_origin: String,
    /// Name as written in the superseded candidate.
    pub superseded_name: String,
    /// Version of the superseded candidate.
    pub superseded_version: SourceVersion,
    /// Origin of the superseded candidate.
    pub superseded_origin: String,
}

impl std::fmt::Display for Override {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (version {}, from {}) supersedes {} (version {}, from {})",
            self.name,
            self.kept_version,
            display_origin(&self.kept_origin),
            self.superseded_name,
            self.superseded_version,
            display_origin(&self.superseded_origin),
        )
    }
}

fn display_origin(origin: &str) -> &str {
    if origin.is_empty() { "<unknown>" } else { origin }
}

/// Result of [`merge_entries`].
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Surviving entries, sorted by case-folded name.
    pub entries: Vec<Entry>,
    /// Every override, in the order it was decided.
    pub overrides: Vec<Override>,
}

/// Merges candidates in extraction order under `policy`.
///
/// The result contains exactly one entry per case-folded name, sorted by
/// case-folded name. Candidates are taken in iteration order, which defines recency.
pub fn merge_entries(
    candidates: impl IntoIterator<Item = Entry>,
    policy: MergePolicy,
) -> MergeOutcome {
    let mut by_key: HashMap<String, Entry> = HashMap::new();
    let mut overrides = Vec::new();

    for candidate in candidates {
        match by_key.entry(fold_name(&candidate.name)) {
            MapEntry::Vacant(slot) => {
                slot.insert(candidate);
            }
            MapEntry::Occupied(mut slot) => {
                let incumbent = slot.get_mut();
                let (kept, superseded) = if policy.replaces(incumbent, &candidate) {
                    let superseded = std::mem::replace(incumbent, candidate);
                    (&*incumbent, superseded)
                } else {
                    (&*incumbent, candidate)
                };
                overrides.push(Override {
                    name: kept.name.clone(),
                    kept_version: kept.version.clone(),
                    kept_origin: kept.origin.clone(),
                    superseded_name: superseded.name,
                    superseded_version: superseded.version,
                    superseded_origin: superseded.origin,
                });
            }
        }
    }

    let mut entries: Vec<Entry> = by_key.into_values().collect();
    sort_by_name(&mut entries);

    MergeOutcome { entries, overrides }
}
