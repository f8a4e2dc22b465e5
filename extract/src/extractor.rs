//! Lazy extraction of entries from source sets.
//!
//! [`Extraction`] reads and parses one [`SourceSet`] at a time as it is
//! iterated. Within a set, declarations are parsed first so that each
//! defaults record can take its type and rank from the matching
//! declaration; declared names with no defaults record are yielded last,
//! with no default.

use std::collections::{HashMap, VecDeque};
use std::fs;

use nldoc_core::{DefaultValue, Entry, fold_name};
use tracing::{debug, info, warn};

use crate::declarations::{Declaration, parse_declarations};
use crate::defaults::parse_defaults;
use crate::report::{ExtractionSummary, ExtractionWarning, WarningKind};
use crate::source::{DocumentKind, DocumentOrigin, SourceDocument, SourceSet};

/// Iterator over the entries of a sequence of source sets.
///
/// Finite and not restartable. Call [`Extraction::finish`] after
/// consumption to obtain counts and warnings.
///
/// # Examples
///
/// ```
/// use nldoc_extract::{SourceDocument, SourceSet, extract};
///
/// let set = SourceSet::new("controls", "15140")
///     .with_document(SourceDocument::defaults_text(
///         "controls.defaults",
///         "! ### FOO\n! Controls foo.\nFOO = 0\n",
///     ));
/// let mut extraction = extract([set]);
/// let entries: Vec<_> = extraction.by_ref().collect();
/// assert_eq!(entries[0].name, "FOO");
/// assert_eq!(entries[0].doc, "Controls foo.");
///
/// let summary = extraction.finish();
/// assert_eq!(summary.yielded, 1);
/// assert!(summary.warnings.is_empty());
/// ```
#[derive(Debug)]
pub struct Extraction {
    pending: VecDeque<SourceSet>,
    buffer: std::vec::IntoIter<Entry>,
    summary: ExtractionSummary,
}

impl Extraction {
    pub(crate) fn new(sets: impl IntoIterator<Item = SourceSet>) -> Self {
        Self {
            pending: sets.into_iter().collect(),
            buffer: Vec::new().into_iter(),
            summary: ExtractionSummary::default(),
        }
    }

    /// Consumes the extraction and returns its totals.
    ///
    /// Entries not yet iterated are not counted as yielded.
    pub fn finish(self) -> ExtractionSummary {
        info!(
            yielded = self.summary.yielded,
            skipped = self.summary.skipped,
            warnings = self.summary.warnings.len(),
            "Extraction finished"
        );
        self.summary
    }

    fn record(&mut self, warning: ExtractionWarning) {
        warn!("{warning}");
        self.summary.warnings.push(warning);
    }

    fn read(&mut self, document: &SourceDocument) -> Option<String> {
        match &document.origin {
            DocumentOrigin::Text { text, .. } => Some(text.clone()),
            DocumentOrigin::Path(path) => match fs::read(path) {
                Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
                Err(err) => {
                    self.record(ExtractionWarning::new(
                        WarningKind::UnreadableDocument,
                        document.label(),
                        err.to_string(),
                    ));
                    None
                }
            },
        }
    }

    fn extract_set(&mut self, set: SourceSet) -> Vec<Entry> {
        debug!(set = %set, documents = set.documents.len(), "Extracting source set");
        let mut warnings = Vec::new();

        let mut declared: Vec<(Declaration, String)> = Vec::new();
        let mut declared_index: HashMap<String, usize> = HashMap::new();
        for document in set.documents_of(DocumentKind::Declarations) {
            let Some(text) = self.read(document) else {
                continue;
            };
            self.summary.documents_read += 1;
            let label = document.label();
            let parsed = parse_declarations(&text, &label, &mut warnings);
            self.summary.skipped += parsed.skipped;
            for decl in parsed.declarations {
                let key = fold_name(&decl.name);
                if declared_index.contains_key(&key) {
                    debug!(name = %decl.name, origin = %label, "Ignoring repeated declaration");
                    continue;
                }
                declared_index.insert(key, declared.len());
                declared.push((decl, label.clone()));
            }
        }

        let mut entries = Vec::new();
        let mut matched = vec![false; declared.len()];
        for document in set.documents_of(DocumentKind::Defaults) {
            let Some(text) = self.read(document) else {
                continue;
            };
            self.summary.documents_read += 1;
            let label = document.label();
            let parsed = parse_defaults(&text, &label, &mut warnings);
            self.summary.skipped += parsed.skipped;

            for record in parsed.records {
                let key = fold_name(&record.name);
                let decl = declared_index.get(&key).map(|&slot| {
                    matched[slot] = true;
                    &declared[slot].0
                });

                let (value_type, dim) = match decl {
                    Some(d) => (d.value_type, d.dim.max(record.dim)),
                    None => {
                        if record.inferred.ambiguous {
                            warnings.push(
                                ExtractionWarning::new(
                                    WarningKind::AmbiguousValue,
                                    label.clone(),
                                    "type not inferable from literal; treating as character",
                                )
                                .at_line(record.line)
                                .for_name(record.name.clone()),
                            );
                        }
                        (record.inferred.value_type, record.dim)
                    }
                };

                let mut entry = Entry::new(record.name, set.version.clone())
                    .with_doc(record.doc)
                    .with_default(record.default)
                    .with_value_type(value_type)
                    .with_namelist(set.namelist.clone())
                    .with_origin(label.clone());
                entry.dim = dim;
                entry.order = Some(record.order);
                entries.push(entry);
            }
        }

        for ((decl, label), seen) in declared.into_iter().zip(matched) {
            if seen {
                continue;
            }
            debug!(name = %decl.name, origin = %label, "Declared without default");
            let mut entry = Entry::new(decl.name, set.version.clone())
                .with_default(DefaultValue::Unset)
                .with_value_type(decl.value_type)
                .with_namelist(set.namelist.clone())
                .with_origin(label);
            entry.dim = decl.dim;
            entries.push(entry);
        }

        for warning in warnings {
            self.record(warning);
        }
        debug!(set = %set, entries = entries.len(), "Source set extracted");
        entries
    }
}

impl Iterator for Extraction {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        loop {
            if let Some(entry) = self.buffer.next() {
                self.summary.yielded += 1;
                return Some(entry);
            }
            let set = self.pending.pop_front()?;
            self.buffer = self.extract_set(set).into_iter();
        }
    }
}
