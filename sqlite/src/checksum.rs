//! SHA-256 content hash over a database's entries and metadata.
//!
//! The hash covers every stored field in name order, so it detects edits
//! made to the artifact outside the builder. Fields are separated by a NUL
//! byte and entries by a record separator; a leading tag distinguishes an
//! unset default from an empty literal.

use nldoc_core::{DatabaseInfo, Entry};
use sha2::{Digest, Sha256};

/// Hex digest of `info` and `entries`.
pub fn content_hash(info: &DatabaseInfo, entries: &[Entry]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(info.schema_version.to_le_bytes());
    hasher.update(info.source_version.as_str().as_bytes());
    hasher.update([0x1e]);

    for entry in entries {
        let dim = entry.dim.to_string();
        let order = entry.order.map(|o| o.to_string()).unwrap_or_default();
        let default = match entry.default.as_literal() {
            Some(text) => format!("L{text}"),
            None => "U".to_string(),
        };
        let fields: [&str; 10] = [
            &entry.name,
            &entry.namelist,
            entry.value_type.label(),
            &dim,
            &order,
            &default,
            &entry.summary,
            &entry.doc,
            entry.version.as_str(),
            &entry.origin,
        ];
        for field in fields {
            hasher.update(field.as_bytes());
            hasher.update([0]);
        }
        hasher.update([0x1e]);
    }

    format!("{:x}", hasher.finalize())
}
