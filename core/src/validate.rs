//! Entry and database validation.
//!
//! Validates the structural invariants a [`Database`](crate::Database)
//! relies on: every name is a non-empty identifier, summaries are single
//! lines, and case-folded names are unique.
//!
//! # Examples
//!
//! ```
//! use nldoc_core::*;
//!
//! assert!(validate_entry(&Entry::new("initial_mass", "1")).is_empty());
//!
//! let errors = validate_entries(&[Entry::new("foo", "1"), Entry::new("FOO", "1")]);
//! assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateName(_))));
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{Entry, fold_name, is_valid_name};

/// Entry validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name is empty or whitespace-only.
    #[error("entry name cannot be empty")]
    EmptyName,
    /// Name is not a Fortran identifier.
    #[error("invalid entry name: {0}")]
    InvalidName(String),
    /// Summary spans more than one line.
    #[error("summary of {0} spans multiple lines")]
    MultilineSummary(String),
    /// Two entries share a case-folded name.
    #[error("duplicate entry name: {0}")]
    DuplicateName(String),
}

/// Validates one entry.
pub fn validate_entry(entry: &Entry) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if entry.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
        return errors;
    }
    if !is_valid_name(&entry.name) {
        errors.push(ValidationError::InvalidName(entry.name.clone()));
        return errors;
    }
    if entry.summary.contains('\n') {
        errors.push(ValidationError::MultilineSummary(entry.name.clone()));
    }

    errors
}

/// Validates a collection of entries, including key uniqueness.
///
/// Stops at the first offending entry.
pub fn validate_entries(entries: &[Entry]) -> Vec<ValidationError> {
    let mut seen: HashSet<String> = HashSet::with_capacity(entries.len());

    for entry in entries {
        let errors = validate_entry(entry);
        if !errors.is_empty() {
            return errors;
        }
        if !seen.insert(fold_name(&entry.name)) {
            return vec![ValidationError::DuplicateName(entry.name.clone())];
        }
    }

    Vec::new()
}
