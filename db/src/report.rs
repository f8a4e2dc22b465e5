//! Build reports.

use std::fmt;
use std::path::PathBuf;

use nldoc_core::SourceVersion;
use nldoc_extract::{ExtractionWarning, WarningKind};
use serde::Serialize;

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Published artifact; `None` for in-memory builds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
    /// Copy of the previous artifact, when one was made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
    /// Source version recorded in the database.
    pub source_version: SourceVersion,
    /// Candidates yielded by extraction.
    pub extracted: usize,
    /// Malformed records skipped during extraction.
    pub skipped: usize,
    /// Candidates replaced by a same-named entry.
    pub superseded: usize,
    /// Entries in the database.
    pub entries: usize,
    /// Extraction warnings followed by one `superseded` warning per override.
    pub warnings: Vec<ExtractionWarning>,
}

impl BuildReport {
    /// Number of warnings of `kind`.
    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries (version {}): {} extracted, {} skipped, {} superseded, {} warnings",
            self.entries,
            self.source_version,
            self.extracted,
            self.skipped,
            self.superseded,
            self.warnings.len()
        )?;
        if let Some(artifact) = &self.artifact {
            write!(f, " -> {}", artifact.display())?;
        }
        Ok(())
    }
}
