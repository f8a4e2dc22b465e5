//! Parsing of namelist defaults documents.
//!
//! A defaults document is a sequence of `name = literal` assignments, each
//! optionally preceded by a documentation block (see [`crate::doc`]).
//! Indexed assignments to the same array (`x_ctrl(1) = ...`,
//! `x_ctrl(2) = ...`) describe one parameter and fold into the first.

use std::collections::HashMap;
use std::sync::LazyLock;

use nldoc_core::{DefaultValue, ValueType, fold_name};
use regex::Regex;
use tracing::debug;

use crate::doc::{DocCollector, doc_header};
use crate::fortran::{comment_body, is_blank, join_continuation, rank_of};
use crate::report::{ExtractionWarning, WarningKind};
use crate::value::{Inferred, infer_value_type};

// SAFETY: static regex literal is valid and covered by tests.
static ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9_]*)\s*(?:\(([^=]*)\))?\s*=\s*(.*)$")
        .expect("static regex must compile")
});

/// One parameter assignment with its documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultsRecord {
    /// Name as written in the first assignment.
    pub name: String,
    pub default: DefaultValue,
    /// Type inferred from the literal; declarations take precedence.
    pub inferred: Inferred,
    /// Rank implied by the assignment index (0 for scalars).
    pub dim: u8,
    /// 0-based position among the document's records.
    pub order: u32,
    pub doc: String,
    /// 1-based line of the first assignment.
    pub line: usize,
}

/// All records of one defaults document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultsDocument {
    pub records: Vec<DefaultsRecord>,
    /// Lines that looked like records but did not parse.
    pub skipped: usize,
}

/// Parses a defaults document.
///
/// Malformed lines are skipped with a [`WarningKind::MalformedRecord`]
/// warning; an assignment with no value yields a record with no default and
/// a [`WarningKind::MissingValue`] warning. Namelist group delimiters
/// (`&controls`, `/`) are ignored.
///
/// # Examples
///
/// ```
/// use nldoc_core::DefaultValue;
/// use nldoc_extract::defaults::parse_defaults;
///
/// let src = "
///       ! ### initial_mass
///
///       ! Initial mass in Msun units.
///
///       initial_mass = 1
/// ";
/// let mut warnings = Vec::new();
/// let parsed = parse_defaults(src, "controls.defaults", &mut warnings);
/// assert_eq!(parsed.records[0].name, "initial_mass");
/// assert_eq!(parsed.records[0].default, DefaultValue::literal("1"));
/// assert_eq!(parsed.records[0].doc, "Initial mass in Msun units.");
/// assert!(warnings.is_empty());
/// ```
pub fn parse_defaults(
    text: &str,
    origin: &str,
    warnings: &mut Vec<ExtractionWarning>,
) -> DefaultsDocument {
    let lines: Vec<&str> = text.lines().collect();
    let mut collector = DocCollector::default();
    let mut parsed = DefaultsDocument::default();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx];
        if is_blank(line) {
            collector.blank();
            idx += 1;
            continue;
        }
        if let Some(body) = comment_body(line) {
            match doc_header(body, lines.get(idx + 1).copied()) {
                Some(header) => {
                    collector.header(header.name);
                    idx += header.consumed;
                }
                None => {
                    if !body.trim_start().starts_with('#') {
                        collector.line(body);
                    }
                    idx += 1;
                }
            }
            continue;
        }

        let number = idx + 1;
        let (statement, consumed) = join_continuation(&lines, idx);
        idx += consumed;
        collector.end_block();

        if statement.is_empty() || statement.starts_with('&') || statement == "/" {
            continue;
        }

        let Some(caps) = ASSIGNMENT_RE.captures(&statement) else {
            warnings.push(
                ExtractionWarning::new(
                    WarningKind::MalformedRecord,
                    origin,
                    format!("expected `name = value`, found `{statement}`"),
                )
                .at_line(number),
            );
            parsed.skipped += 1;
            continue;
        };

        let name = &caps[1];
        let index = caps.get(2).map(|m| m.as_str());
        let value = caps[3].trim().trim_end_matches(',').trim_end();
        let key = fold_name(name);

        if let Some(&slot) = seen.get(&key) {
            let first = &mut parsed.records[slot];
            match index {
                Some(index) if first.dim > 0 => {
                    first.dim = first.dim.max(rank_of(index));
                    debug!(origin, name, line = number, "Folding indexed assignment into first");
                }
                _ => warnings.push(
                    ExtractionWarning::new(
                        WarningKind::DuplicateInDocument,
                        origin,
                        format!("already assigned on line {}; keeping the first", first.line),
                    )
                    .at_line(number)
                    .for_name(name),
                ),
            }
            continue;
        }

        let (default, inferred) = if value.is_empty() {
            warnings.push(
                ExtractionWarning::new(WarningKind::MissingValue, origin, "assignment has no value")
                    .at_line(number)
                    .for_name(name),
            );
            let inferred = Inferred {
                value_type: ValueType::Unknown,
                ambiguous: false,
            };
            (DefaultValue::Unset, inferred)
        } else {
            (DefaultValue::literal(value), infer_value_type(value))
        };

        seen.insert(key, parsed.records.len());
        parsed.records.push(DefaultsRecord {
            name: name.to_string(),
            default,
            inferred,
            dim: index.map(rank_of).unwrap_or(0),
            order: u32::try_from(parsed.records.len()).unwrap_or(u32::MAX),
            doc: String::new(),
            line: number,
        });
    }

    let mut docs = collector.finish();
    for record in &mut parsed.records {
        if let Some(doc) = docs.remove(&fold_name(&record.name)) {
            record.doc = doc;
        }
    }

    parsed
}
