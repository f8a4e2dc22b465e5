//! Parsing of Fortran type declarations.
//!
//! Declarations supply the authoritative type and rank of each parameter,
//! and the full set of declared names. Only the declaration section of a
//! file is read: parsing stops at a `contains` statement.

use nldoc_core::{ValueType, is_valid_name};
use tracing::debug;

use crate::fortran::{code_lines, rank_of, split_parenthesized, split_top_level};
use crate::report::{ExtractionWarning, WarningKind};
use crate::value::type_from_spec;

/// One declared variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Name as written in the declaration.
    pub name: String,
    pub value_type: ValueType,
    /// Array rank (0 for scalars).
    pub dim: u8,
    /// 1-based line of the declaration statement.
    pub line: usize,
}

/// All declarations of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationsDocument {
    pub declarations: Vec<Declaration>,
    /// Declared names that were not valid identifiers.
    pub skipped: usize,
}

/// Parses every `type [, attrs] :: names` statement in `text`.
///
/// Named constants (`parameter`) and derived-type variables are skipped.
/// Names that are not valid identifiers produce a
/// [`WarningKind::MalformedRecord`] warning.
///
/// # Examples
///
/// ```
/// use nldoc_core::ValueType;
/// use nldoc_extract::declarations::parse_declarations;
///
/// let src = "
///    logical :: use_other_wind
///    real(dp), dimension(3) :: xa_central
///    integer, parameter :: max_extras = 10
/// contains
///    integer :: ignored
/// ";
/// let mut warnings = Vec::new();
/// let parsed = parse_declarations(src, "star_controls.inc", &mut warnings);
/// let decls = &parsed.declarations;
/// assert_eq!(decls.len(), 2);
/// assert_eq!(decls[1].name, "xa_central");
/// assert_eq!(decls[1].value_type, ValueType::Real);
/// assert_eq!(decls[1].dim, 1);
/// ```
pub fn parse_declarations(
    text: &str,
    origin: &str,
    warnings: &mut Vec<ExtractionWarning>,
) -> DeclarationsDocument {
    let mut parsed = DeclarationsDocument::default();

    for line in code_lines(text) {
        let lower = line.text.to_ascii_lowercase();
        if lower == "contains" || lower.starts_with("contains ") {
            break;
        }
        let Some((spec, names)) = line.text.split_once("::") else {
            continue;
        };

        let attrs = split_top_level(spec, ',');
        let value_type = type_from_spec(attrs[0]);
        if value_type == ValueType::Unknown {
            debug!(origin, line = line.number, spec = attrs[0].trim(), "Skipping non-intrinsic declaration");
            continue;
        }
        if attrs[1..]
            .iter()
            .any(|a| a.trim().eq_ignore_ascii_case("parameter"))
        {
            continue;
        }
        let attr_dim = attrs[1..].iter().find_map(|a| {
            let a = a.trim();
            if !a.to_ascii_lowercase().starts_with("dimension") {
                return None;
            }
            split_parenthesized(a).map(|(_, inner)| rank_of(inner))
        });

        for raw in split_top_level(names, ',') {
            let target = split_top_level(raw, '=')[0].trim();
            if target.is_empty() {
                continue;
            }
            let (name, dim) = match split_parenthesized(target) {
                Some((head, inner)) => (head.trim(), rank_of(inner)),
                None => (target, attr_dim.unwrap_or(0)),
            };
            // `character :: name*20` length suffix
            let name = name.split('*').next().unwrap_or(name).trim();

            if !is_valid_name(name) {
                warnings.push(
                    ExtractionWarning::new(
                        WarningKind::MalformedRecord,
                        origin,
                        format!("invalid declared name `{name}`"),
                    )
                    .at_line(line.number),
                );
                parsed.skipped += 1;
                continue;
            }

            parsed.declarations.push(Declaration {
                name: name.to_string(),
                value_type,
                dim,
                line: line.number,
            });
        }
    }

    parsed
}
