//! Source descriptions: which documents make up one namelist.

use std::fmt;
use std::path::{Path, PathBuf};

use nldoc_core::SourceVersion;
use serde::{Deserialize, Serialize};

/// Role of a document within a source set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Assignments with documentation comments.
    Defaults,
    /// Fortran type declarations.
    Declarations,
}

/// Where a document's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOrigin {
    Path(PathBuf),
    Text { label: String, text: String },
}

/// One document of a source set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub kind: DocumentKind,
    pub origin: DocumentOrigin,
}

impl SourceDocument {
    pub fn defaults_file(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: DocumentKind::Defaults,
            origin: DocumentOrigin::Path(path.into()),
        }
    }

    pub fn declarations_file(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: DocumentKind::Declarations,
            origin: DocumentOrigin::Path(path.into()),
        }
    }

    pub fn defaults_text(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::Defaults,
            origin: DocumentOrigin::Text {
                label: label.into(),
                text: text.into(),
            },
        }
    }

    pub fn declarations_text(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::Declarations,
            origin: DocumentOrigin::Text {
                label: label.into(),
                text: text.into(),
            },
        }
    }

    /// Human-readable label: the path, or the label of inline text.
    pub fn label(&self) -> String {
        match &self.origin {
            DocumentOrigin::Path(path) => path.display().to_string(),
            DocumentOrigin::Text { label, .. } => label.clone(),
        }
    }

    /// Path of a file-backed document.
    pub fn path(&self) -> Option<&Path> {
        match &self.origin {
            DocumentOrigin::Path(path) => Some(path),
            DocumentOrigin::Text { .. } => None,
        }
    }
}

/// The documents describing one namelist at one source version.
///
/// # Examples
///
/// ```
/// use nldoc_extract::{SourceDocument, SourceSet};
///
/// let set = SourceSet::new("controls", "15140")
///     .with_document(SourceDocument::defaults_file("star/defaults/controls.defaults"))
///     .with_document(SourceDocument::declarations_file("star/private/star_controls.inc"));
/// assert_eq!(set.documents.len(), 2);
/// assert_eq!(set.version.as_str(), "15140");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    pub namelist: String,
    pub version: SourceVersion,
    pub documents: Vec<SourceDocument>,
}

impl SourceSet {
    pub fn new(namelist: impl Into<String>, version: impl Into<SourceVersion>) -> Self {
        Self {
            namelist: namelist.into(),
            version: version.into(),
            documents: Vec::new(),
        }
    }

    pub fn with_document(mut self, document: SourceDocument) -> Self {
        self.documents.push(document);
        self
    }

    /// Documents of the given kind, in the order they were added.
    pub fn documents_of(&self, kind: DocumentKind) -> impl Iterator<Item = &SourceDocument> {
        self.documents.iter().filter(move |d| d.kind == kind)
    }
}

impl fmt::Display for SourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.namelist, self.version)
    }
}
