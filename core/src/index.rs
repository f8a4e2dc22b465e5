//! Search indices derived from a database's entries.
//!
//! Indices are positional: slot `i` describes entry `i` of the owning
//! database, whose entries are sorted by case-folded name. Collecting matching slots
//! into an ordered set therefore yields results in name order.

use std::collections::HashMap;

use crate::{Entry, fold_name};

/// Exact lookup by case-folded name.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExactIndex {
    by_key: HashMap<String, usize>,
}

impl ExactIndex {
    pub(crate) fn new(entries: &[Entry]) -> Self {
        let by_key = entries
            .iter()
            .enumerate()
            .map(|(slot, entry)| (fold_name(&entry.name), slot))
            .collect();
        Self { by_key }
    }

    pub(crate) fn get(&self, name: &str) -> Option<usize> {
        self.by_key.get(&fold_name(name)).copied()
    }
}

/// Substring and prefix matching over case-folded names.
#[derive(Debug, Clone, Default)]
pub(crate) struct NameIndex {
    folded: Vec<String>,
    /// Slots ordered by folded name, for prefix range scans.
    sorted: Vec<usize>,
}

impl NameIndex {
    pub(crate) fn new(entries: &[Entry]) -> Self {
        let folded: Vec<String> = entries.iter().map(|e| fold_name(&e.name)).collect();
        let mut sorted: Vec<usize> = (0..folded.len()).collect();
        sorted.sort_by(|&a, &b| folded[a].cmp(&folded[b]));
        Self { folded, sorted }
    }

    /// Slots whose folded name contains `needle` (already folded).
    pub(crate) fn containing<'a>(&'a self, needle: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.folded
            .iter()
            .enumerate()
            .filter(move |(_, name)| name.contains(needle))
            .map(|(slot, _)| slot)
    }

    /// Slots whose folded name starts with `prefix` (already folded).
    pub(crate) fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = usize> + 'a {
        let start = self
            .sorted
            .partition_point(|&slot| self.folded[slot].as_str() < prefix);
        self.sorted[start..]
            .iter()
            .copied()
            .take_while(move |&slot| self.folded[slot].starts_with(prefix))
    }
}

/// Substring matching over case-folded `summary` + `doc` text.
#[derive(Debug, Clone, Default)]
pub(crate) struct TextIndex {
    haystacks: Vec<String>,
}

impl TextIndex {
    pub(crate) fn new(entries: &[Entry]) -> Self {
        let haystacks = entries
            .iter()
            .map(|e| {
                let mut text = String::with_capacity(e.summary.len() + e.doc.len() + 1);
                text.push_str(&e.summary);
                text.push('\n');
                text.push_str(&e.doc);
                text.to_lowercase()
            })
            .collect();
        Self { haystacks }
    }

    /// Slots whose folded text contains `needle` (already folded).
    pub(crate) fn containing<'a>(&'a self, needle: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.haystacks
            .iter()
            .enumerate()
            .filter(move |(_, text)| text.contains(needle))
            .map(|(slot, _)| slot)
    }
}
