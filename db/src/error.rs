//! Error types for building and loading databases.

use nldoc_core::ValidationError;
use nldoc_sqlite::StoreError;
use thiserror::Error;

/// Errors that can occur while building or loading a database.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Extraction produced no entries at all.
    #[error("no entries extracted from any source")]
    NoEntriesExtracted,

    /// Artifact read or write failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Merged entries violate a database invariant.
    #[error("invalid database: {0}")]
    Validation(#[from] ValidationError),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Build configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No source root was given and `MESA_DIR` is not set.
    #[error("no source root given and MESA_DIR is not set")]
    MissingSourceRoot,
}

impl DatabaseError {
    /// Returns `true` for "no artifact at this path".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(StoreError::ArtifactNotFound(_)))
    }
}

/// Convenience alias for results with [`DatabaseError`].
pub type Result<T> = std::result::Result<T, DatabaseError>;
