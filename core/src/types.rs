//! Entry type definitions for namelist documentation.
//!
//! This module defines the record schema shared by the extractor, the
//! builder, the artifact store and the query engine. The types derive
//! [`serde`] traits so they can round-trip through JSON and SQLite rows.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Version of the persisted database layout.
///
/// Stored in every artifact and compared on load. Bump it whenever the
/// artifact's tables or row encoding change incompatibly.
pub const DATABASE_SCHEMA_VERSION: u32 = 1;

/// Textual rendering of [`DefaultValue::Unset`].
pub const NO_DEFAULT_MARKER: &str = "<no default>";

/// Folds a name to the form used for identity and matching.
///
/// # Examples
///
/// ```
/// use nldoc_core::fold_name;
///
/// assert_eq!(fold_name("Initial_Mass"), "initial_mass");
/// assert_eq!(fold_name("BAZ"), fold_name("baz"));
/// ```
pub fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

/// Returns `true` if `name` is a valid Fortran identifier.
///
/// # Examples
///
/// ```
/// use nldoc_core::is_valid_name;
///
/// assert!(is_valid_name("x_ctrl"));
/// assert!(!is_valid_name("1abc"));
/// assert!(!is_valid_name("has space"));
/// assert!(!is_valid_name(""));
/// ```
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic() && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Release identifier of the MESA sources an entry came from.
///
/// Versions are opaque strings with a natural ordering: runs of digits
/// compare numerically and everything else compares lexically, so `v10`
/// sorts after `v9` and `r22.11.1` after `r22.5.1`.
///
/// # Examples
///
/// ```
/// use nldoc_core::SourceVersion;
///
/// assert!(SourceVersion::new("v2") > SourceVersion::new("v1"));
/// assert!(SourceVersion::new("15140") > SourceVersion::new("7380"));
/// assert!(SourceVersion::new("r22.11.1") > SourceVersion::new("r22.5.1"));
/// assert_eq!(SourceVersion::new("v1").as_str(), "v1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct SourceVersion(String);

impl SourceVersion {
    /// Creates a version from its textual form (surrounding whitespace is trimmed).
    pub fn new(version: impl Into<String>) -> Self {
        let version = version.into();
        let trimmed = version.trim();
        if trimmed.len() == version.len() {
            Self(version)
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Returns the version as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the leading integer of the version, if it starts with one.
    ///
    /// MESA used plain integers (`7380`, `15140`) before switching to
    /// `rYY.MM.N` tags; some source layouts depend on the integer form.
    pub fn as_number(&self) -> Option<u64> {
        let digits: String = self.0.chars().take_while(|ch| ch.is_ascii_digit()).collect();
        digits.parse().ok()
    }

    fn chunks(&self) -> impl Iterator<Item = VersionChunk<'_>> {
        let s = self.0.as_str();
        let mut rest = s;
        std::iter::from_fn(move || {
            let first = rest.chars().next()?;
            let numeric = first.is_ascii_digit();
            let end = rest
                .find(|ch: char| ch.is_ascii_digit() != numeric)
                .unwrap_or(rest.len());
            let (chunk, tail) = rest.split_at(end);
            rest = tail;
            Some(if numeric {
                VersionChunk::Number(chunk.trim_start_matches('0'))
            } else {
                VersionChunk::Text(chunk)
            })
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
enum VersionChunk<'a> {
    /// Digit run with leading zeros removed.
    Number(&'a str),
    Text(&'a str),
}

impl Ord for VersionChunk<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for VersionChunk<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourceVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chunks()
            .cmp(other.chunks())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for SourceVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceVersion {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Default value of an entry.
///
/// `Unset` is the explicit "no default" marker. It is distinct from a
/// literal empty string (`''` in Fortran source).
///
/// # Examples
///
/// ```
/// use nldoc_core::{DefaultValue, NO_DEFAULT_MARKER};
///
/// assert_eq!(DefaultValue::literal(".true.").to_string(), ".true.");
/// assert_eq!(DefaultValue::Unset.to_string(), NO_DEFAULT_MARKER);
/// assert!(DefaultValue::Unset.is_unset());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// No default is defined.
    #[default]
    Unset,
    /// Literal as written in the source document.
    Literal(String),
}

impl DefaultValue {
    /// Creates a literal default.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Returns `true` for the "no default" marker.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Returns the literal text, if any.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(text) => Some(text),
            Self::Unset => None,
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str(NO_DEFAULT_MARKER),
            Self::Literal(text) => f.write_str(text),
        }
    }
}

/// Fortran value type of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// `logical`
    Logical,
    /// `character(len=...)`
    Character,
    /// `integer`
    Integer,
    /// `real(dp)` / `double precision`
    Real,
    /// Type could not be determined.
    #[default]
    Unknown,
}

impl ValueType {
    /// Stable lowercase label, used in storage and output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Logical => "logical",
            Self::Character => "character",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Unknown => "unknown",
        }
    }

    /// Parses a label produced by [`label`](Self::label).
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "logical" => Some(Self::Logical),
            "character" => Some(Self::Character),
            "integer" => Some(Self::Integer),
            "real" => Some(Self::Real),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One documented namelist parameter.
///
/// # Examples
///
/// ```
/// use nldoc_core::*;
///
/// let entry = Entry::new("initial_mass", "15140")
///     .with_doc("Initial mass in Msun units.")
///     .with_default(DefaultValue::literal("1"))
///     .with_value_type(ValueType::Real);
///
/// assert_eq!(entry.key(), "initial_mass");
/// assert_eq!(entry.summary, "Initial mass in Msun units.");
/// assert_eq!(entry.version, SourceVersion::new("15140"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Parameter name, case preserved as written in the source.
    pub name: String,
    /// One-line summary (may be empty).
    pub summary: String,
    /// Long-form documentation (may be empty).
    pub doc: String,
    /// Default value or the "no default" marker.
    pub default: DefaultValue,
    /// Source release version.
    pub version: SourceVersion,
    /// Namelist this parameter belongs to.
    #[serde(default)]
    pub namelist: String,
    /// Declared or inferred Fortran type.
    #[serde(default)]
    pub value_type: ValueType,
    /// Array rank (0 for scalars).
    #[serde(default)]
    pub dim: u8,
    /// Position of the assignment in its defaults document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    /// Label of the source document this entry was extracted from.
    #[serde(default)]
    pub origin: String,
}

impl Entry {
    /// Creates an entry with empty documentation and no default.
    pub fn new(name: impl Into<String>, version: impl Into<SourceVersion>) -> Self {
        Self {
            name: name.into(),
            summary: String::new(),
            doc: String::new(),
            default: DefaultValue::Unset,
            version: version.into(),
            namelist: String::new(),
            value_type: ValueType::Unknown,
            dim: 0,
            order: None,
            origin: String::new(),
        }
    }

    /// Sets the documentation and derives the summary from it.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self.summary = summarize(&self.doc);
        self
    }

    /// Overrides the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = default;
        self
    }

    /// Sets the value type.
    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Sets the namelist.
    pub fn with_namelist(mut self, namelist: impl Into<String>) -> Self {
        self.namelist = namelist.into();
        self
    }

    /// Sets the origin label.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Case-folded identity key.
    pub fn key(&self) -> String {
        fold_name(&self.name)
    }
}

/// Sorts entries by case-folded name, then by name as written.
///
/// # Examples
///
/// ```
/// use nldoc_core::{Entry, sort_by_name};
///
/// let mut entries = vec![Entry::new("pre_ms_T_c", "1"), Entry::new("pre_ms_guess_rho_c", "1")];
/// sort_by_name(&mut entries);
/// assert_eq!(entries[0].name, "pre_ms_guess_rho_c");
/// ```
pub fn sort_by_name(entries: &mut [Entry]) {
    entries.sort_by_cached_key(|e| (e.key(), e.name.clone()));
}

/// Maximum summary length in characters, excluding the ellipsis.
pub const SUMMARY_MAX_CHARS: usize = 160;

/// Derives a one-line summary from documentation text.
///
/// Takes the first sentence of the first paragraph, collapses whitespace,
/// and caps the result at [`SUMMARY_MAX_CHARS`].
///
/// # Examples
///
/// ```
/// use nldoc_core::summarize;
///
/// let doc = "Controls foo. Larger values\nmean more foo.\n\nSecond paragraph.";
/// assert_eq!(summarize(doc), "Controls foo.");
/// assert_eq!(summarize("  no period here\nstill first paragraph "), "no period here still first paragraph");
/// assert_eq!(summarize(""), "");
/// ```
pub fn summarize(doc: &str) -> String {
    let paragraph = doc
        .split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty())
        .unwrap_or_default();
    let collapsed = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");

    let sentence = match collapsed.find(". ") {
        Some(idx) => &collapsed[..=idx],
        None => collapsed.as_str(),
    };

    if sentence.chars().count() <= SUMMARY_MAX_CHARS {
        return sentence.to_string();
    }
    let cut: String = sentence.chars().take(SUMMARY_MAX_CHARS).collect();
    format!("{}...", cut.trim_end())
}
