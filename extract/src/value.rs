//! Value type inference for default literals.

use std::sync::LazyLock;

use nldoc_core::ValueType;
use regex::Regex;

// SAFETY: static regex literals are valid and covered by tests.
static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+(_\w+)?$").expect("static regex must compile"));
static REAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eEdDqQ][+-]?\d+)?(_\w+)?$")
        .expect("static regex must compile")
});

/// Result of inferring a type from a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inferred {
    pub value_type: ValueType,
    /// `true` when the literal matched no known form and was treated as text.
    pub ambiguous: bool,
}

impl Inferred {
    fn exact(value_type: ValueType) -> Self {
        Self {
            value_type,
            ambiguous: false,
        }
    }
}

/// Infers the Fortran type of a default literal.
///
/// Logical literals, quoted strings, integers and reals are recognized.
/// Anything else (named constants, expressions) falls back to
/// [`ValueType::Character`] and is flagged ambiguous.
///
/// # Examples
///
/// ```
/// use nldoc_core::ValueType;
/// use nldoc_extract::value::infer_value_type;
///
/// assert_eq!(infer_value_type(".true.").value_type, ValueType::Logical);
/// assert_eq!(infer_value_type("'none'").value_type, ValueType::Character);
/// assert_eq!(infer_value_type("-1").value_type, ValueType::Integer);
/// assert_eq!(infer_value_type("1d-4").value_type, ValueType::Real);
/// assert!(infer_value_type("huge(1d0)").ambiguous);
/// ```
pub fn infer_value_type(literal: &str) -> Inferred {
    let literal = literal.trim();
    let lower = literal.to_ascii_lowercase();

    if matches!(lower.as_str(), ".true." | ".false." | ".t." | ".f.") {
        return Inferred::exact(ValueType::Logical);
    }
    if literal.starts_with('\'') || literal.starts_with('"') {
        return Inferred::exact(ValueType::Character);
    }
    if INTEGER_RE.is_match(literal) {
        return Inferred::exact(ValueType::Integer);
    }
    if REAL_RE.is_match(literal) {
        return Inferred::exact(ValueType::Real);
    }

    Inferred {
        value_type: ValueType::Character,
        ambiguous: true,
    }
}

/// Maps a declaration type specifier (`real(dp)`, `logical`, ...) to a
/// [`ValueType`]. Derived and unrecognized types map to `Unknown`.
pub fn type_from_spec(spec: &str) -> ValueType {
    let spec = spec.trim().to_ascii_lowercase();
    let head: String = spec
        .chars()
        .take_while(|c| c.is_ascii_alphabetic() || *c == ' ')
        .collect();
    let head = head.trim();

    if head == "logical" {
        ValueType::Logical
    } else if head == "character" {
        ValueType::Character
    } else if head == "integer" {
        ValueType::Integer
    } else if head == "real" || head == "double precision" || head == "doubleprecision" {
        ValueType::Real
    } else {
        ValueType::Unknown
    }
}
