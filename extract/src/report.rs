//! Structured warnings and summaries for extraction runs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a non-fatal extraction or build warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A line looked like a record but could not be parsed; it was skipped.
    MalformedRecord,
    /// A source document could not be read; its set continued without it.
    UnreadableDocument,
    /// A literal's type could not be inferred and no declaration resolved it.
    AmbiguousValue,
    /// An assignment had no value; the entry was kept with no default.
    MissingValue,
    /// A scalar name was assigned twice in one document; the first was kept.
    DuplicateInDocument,
    /// An entry replaced another with the same folded name during a build.
    Superseded,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRecord => write!(f, "malformed_record"),
            Self::UnreadableDocument => write!(f, "unreadable_document"),
            Self::AmbiguousValue => write!(f, "ambiguous_value"),
            Self::MissingValue => write!(f, "missing_value"),
            Self::DuplicateInDocument => write!(f, "duplicate_in_document"),
            Self::Superseded => write!(f, "superseded"),
        }
    }
}

/// One warning with enough context to locate its cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    pub kind: WarningKind,
    /// Label of the document (or set) the warning refers to.
    pub origin: String,
    /// 1-based line number, when the warning refers to a line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Parameter name, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub detail: String,
}

impl ExtractionWarning {
    pub fn new(kind: WarningKind, origin: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            origin: origin.into(),
            line: None,
            name: None,
            detail: detail.into(),
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn for_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.origin)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        write!(f, ": {}", self.kind)?;
        if let Some(name) = &self.name {
            write!(f, " [{name}]")?;
        }
        write!(f, ": {}", self.detail)
    }
}

/// Totals for a finished extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    /// Entries yielded to the caller.
    pub yielded: usize,
    /// Records skipped as malformed.
    pub skipped: usize,
    /// Source documents successfully read.
    pub documents_read: usize,
    pub warnings: Vec<ExtractionWarning>,
}

impl ExtractionSummary {
    /// Number of warnings of `kind`.
    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display_includes_location() {
        let warning = ExtractionWarning::new(WarningKind::MissingValue, "controls.defaults", "no value")
            .at_line(12)
            .for_name("foo");
        assert_eq!(
            warning.to_string(),
            "controls.defaults:12: missing_value [foo]: no value"
        );
    }

    #[test]
    fn test_warning_kind_serializes_snake_case() {
        let json = serde_json::to_string(&WarningKind::DuplicateInDocument).unwrap();
        assert_eq!(json, "\"duplicate_in_document\"");
    }

    #[test]
    fn test_summary_counts_by_kind() {
        let summary = ExtractionSummary {
            warnings: vec![
                ExtractionWarning::new(WarningKind::MalformedRecord, "a", "x"),
                ExtractionWarning::new(WarningKind::MalformedRecord, "a", "y"),
                ExtractionWarning::new(WarningKind::AmbiguousValue, "a", "z"),
            ],
            ..Default::default()
        };
        assert_eq!(summary.count(WarningKind::MalformedRecord), 2);
        assert_eq!(summary.count(WarningKind::Superseded), 0);
    }
}
