//! Error types for artifact storage.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing a persisted database artifact.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No artifact exists at the given path.
    #[error("artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    /// The artifact was written with a different schema version.
    #[error("artifact schema version {found} is not supported (expected {supported})")]
    ArtifactIncompatible { found: u32, supported: u32 },

    /// The artifact exists but cannot be decoded.
    #[error("artifact is corrupt: {0}")]
    ArtifactCorrupt(String),

    /// SQLite failure while writing.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn corrupt(reason: impl std::fmt::Display) -> Self {
        Self::ArtifactCorrupt(reason.to_string())
    }
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
