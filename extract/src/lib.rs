//! Extraction of namelist parameter documentation from Fortran sources.
//!
//! A namelist is described by a [`SourceSet`]: one or more defaults
//! documents (`name = literal` assignments preceded by documentation
//! comments) and zero or more declaration documents (Fortran type
//! declarations). [`extract`] turns a sequence of source sets into a lazy
//! stream of [`Entry`] values; malformed input never aborts the stream but
//! is reported as an [`ExtractionWarning`].
//!
//! # Example
//!
//! ```
//! use nldoc_core::DefaultValue;
//! use nldoc_extract::{SourceDocument, SourceSet, extract};
//!
//! let defaults = "
//!       ! ### initial_mass
//!       ! Initial mass in Msun units.
//!       initial_mass = 1
//!
//!       this line is garbage
//! ";
//! let set = SourceSet::new("controls", "15140")
//!     .with_document(SourceDocument::defaults_text("controls.defaults", defaults))
//!     .with_document(SourceDocument::declarations_text(
//!         "star_controls.inc",
//!         "real(dp) :: initial_mass\nlogical :: use_other_wind\n",
//!     ));
//!
//! let mut extraction = extract([set]);
//! let entries: Vec<_> = extraction.by_ref().collect();
//! assert_eq!(entries.len(), 2);
//! assert_eq!(entries[1].default, DefaultValue::Unset);
//!
//! let summary = extraction.finish();
//! assert_eq!(summary.skipped, 1);
//! ```
//!
//! [`Entry`]: nldoc_core::Entry

pub mod declarations;
pub mod defaults;
mod doc;
pub mod extractor;
pub mod fortran;
pub mod report;
pub mod source;
pub mod value;

pub use extractor::Extraction;
pub use report::{ExtractionSummary, ExtractionWarning, WarningKind};
pub use source::{DocumentKind, DocumentOrigin, SourceDocument, SourceSet};

/// Starts a lazy extraction over `sets`, processed in order.
pub fn extract(sets: impl IntoIterator<Item = SourceSet>) -> Extraction {
    Extraction::new(sets)
}
