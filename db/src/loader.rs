//! Loading persisted databases.
//!
//! ```no_run
//! use nldoc_core::QueryEngine;
//!
//! let db = nldoc_db::load_default().unwrap();
//! println!("{}", QueryEngine::new(&db).version());
//! ```

use std::path::{Path, PathBuf};

use nldoc_core::Database;
use nldoc_sqlite::read_artifact;
use tracing::debug;

use crate::config::{DEFAULT_ARTIFACT, source_root_from_env};
use crate::error::{DatabaseError, Result};

/// Loads the artifact at `path`.
///
/// # Errors
///
/// [`DatabaseError::Store`] wrapping `ArtifactNotFound`,
/// `ArtifactIncompatible` or `ArtifactCorrupt`.
pub fn load(path: impl AsRef<Path>) -> Result<Database> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading database");
    Ok(read_artifact(path)?)
}

/// The default artifact location, `$MESA_DIR/data/mesa.db`.
///
/// # Errors
///
/// [`DatabaseError::MissingSourceRoot`] if `MESA_DIR` is not set.
pub fn default_artifact_path() -> Result<PathBuf> {
    source_root_from_env()
        .map(|root| root.join(DEFAULT_ARTIFACT))
        .ok_or(DatabaseError::MissingSourceRoot)
}

/// Loads the artifact at the default location.
///
/// # Errors
///
/// As [`default_artifact_path`] and [`load`].
pub fn load_default() -> Result<Database> {
    load(default_artifact_path()?)
}
