//! Reading and atomically publishing database artifacts.
//!
//! An artifact is a single SQLite file. Publishing writes a complete
//! database to a temporary file in the target directory and renames it over
//! the destination, so readers observe either the previous artifact or the
//! new one. A temporary file left by a failed write is removed when its
//! handle drops.
//!
//! # Example
//!
//! ```
//! use nldoc_core::{Database, Entry};
//! use nldoc_sqlite::{WriteOptions, read_artifact, write_artifact};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("mesa.db");
//! let db = Database::from_entries(vec![Entry::new("foo", "1")], "2024-01-01T00:00:00Z").unwrap();
//!
//! write_artifact(&path, &db, &WriteOptions::default()).unwrap();
//! assert_eq!(read_artifact(&path).unwrap(), db);
//! ```

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use nldoc_core::{DATABASE_SCHEMA_VERSION, Database, DatabaseInfo, SourceVersion};
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

use crate::checksum::content_hash;
use crate::convert::{insert_entries, insert_meta, load_entries, load_meta};
use crate::error::{Result, StoreError};
use crate::schema::{
    META_CONTENT_HASH, META_ENTRY_COUNT, META_GENERATED_AT, META_SOURCE_VERSION, SCHEMA_SQL,
    check_tables, user_version,
};

/// Options for [`write_artifact`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Copy an existing artifact to [`backup_path`] before replacing it.
    pub backup_previous: bool,
}

/// Outcome of a successful [`write_artifact`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifact {
    pub path: PathBuf,
    /// Where the previous artifact was copied, if it was.
    pub backup: Option<PathBuf>,
}

/// Returns the backup location for `path`: `<stem>_old.<ext>`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use nldoc_sqlite::backup_path;
///
/// assert_eq!(backup_path(Path::new("data/mesa.db")), Path::new("data/mesa_old.db"));
/// assert_eq!(backup_path(Path::new("artifact")), Path::new("artifact_old"));
/// ```
pub fn backup_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_old.{}", ext.to_string_lossy()),
        None => format!("{stem}_old"),
    };
    path.with_file_name(name)
}

/// Writes `db` into an open connection: layout, rows, metadata and
/// `user_version`, in one transaction.
///
/// # Errors
///
/// [`StoreError::Sqlite`] if any statement fails; nothing is committed.
pub fn write_database(conn: &mut Connection, db: &Database) -> Result<()> {
    let info = db.info();
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    insert_entries(&tx, db.entries())?;
    insert_meta(
        &tx,
        &[
            (META_SOURCE_VERSION, info.source_version.to_string()),
            (META_GENERATED_AT, info.generated_at.clone()),
            (META_ENTRY_COUNT, db.len().to_string()),
            (META_CONTENT_HASH, content_hash(info, db.entries())),
        ],
    )?;
    tx.pragma_update(None, "user_version", info.schema_version)?;
    tx.commit()?;
    Ok(())
}

/// Reads a complete database from an open connection.
///
/// The schema version is checked before any table is read.
///
/// # Errors
///
/// - [`StoreError::ArtifactIncompatible`] if `user_version` is a different
///   non-zero layout version.
/// - [`StoreError::ArtifactCorrupt`] for anything else that prevents
///   decoding: not a database, missing tables or metadata, invalid rows,
///   duplicate names, or a checksum mismatch.
pub fn read_database(conn: &Connection) -> Result<Database> {
    let found = user_version(conn)?;
    if found == 0 {
        return Err(StoreError::corrupt("missing schema version"));
    }
    if found != DATABASE_SCHEMA_VERSION {
        return Err(StoreError::ArtifactIncompatible {
            found,
            supported: DATABASE_SCHEMA_VERSION,
        });
    }
    check_tables(conn)?;

    let meta = load_meta(conn)?;
    let field = |key: &str| {
        meta.get(key)
            .cloned()
            .ok_or_else(|| StoreError::corrupt(format!("missing metadata `{key}`")))
    };
    let info = DatabaseInfo {
        schema_version: found,
        source_version: SourceVersion::new(field(META_SOURCE_VERSION)?),
        generated_at: field(META_GENERATED_AT)?,
    };
    let expected_count: usize = field(META_ENTRY_COUNT)?
        .parse()
        .map_err(|_| StoreError::corrupt("invalid entry count"))?;
    let expected_hash = field(META_CONTENT_HASH)?;

    let entries = load_entries(conn)?;
    if entries.len() != expected_count {
        return Err(StoreError::corrupt(format!(
            "expected {expected_count} entries, found {}",
            entries.len()
        )));
    }

    let db = Database::new(entries, info).map_err(StoreError::corrupt)?;
    if content_hash(db.info(), db.entries()) != expected_hash {
        return Err(StoreError::corrupt("content checksum mismatch"));
    }
    Ok(db)
}

/// Loads the artifact at `path`.
///
/// # Errors
///
/// [`StoreError::ArtifactNotFound`] if no file exists at `path`, otherwise
/// as [`read_database`].
pub fn read_artifact(path: impl AsRef<Path>) -> Result<Database> {
    let path = path.as_ref();
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Err(StoreError::corrupt(format!("{} is not a file", path.display()))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::ArtifactNotFound(path.to_path_buf()));
        }
        Err(err) => return Err(StoreError::Io(err)),
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(StoreError::corrupt)?;
    let db = read_database(&conn)?;
    info!(path = %path.display(), entries = db.len(), version = %db.info().source_version, "Loaded artifact");
    Ok(db)
}

/// Atomically publishes `db` at `path`.
///
/// The parent directory is created if needed. On failure the previous
/// artifact, if any, is left untouched.
///
/// # Errors
///
/// [`StoreError::Sqlite`] or [`StoreError::Io`] if writing, backing up or
/// renaming fails.
pub fn write_artifact(
    path: impl AsRef<Path>,
    db: &Database,
    options: &WriteOptions,
) -> Result<PublishedArtifact> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let temp = tempfile::Builder::new()
        .prefix(".nldoc-")
        .suffix(".tmp")
        .tempfile_in(&parent)?;
    debug!(temp = %temp.path().display(), "Writing artifact to temporary file");

    let mut conn = Connection::open(temp.path())?;
    write_database(&mut conn, db)?;
    conn.close().map_err(|(_, err)| StoreError::Sqlite(err))?;
    temp.as_file().sync_all()?;

    let backup = if options.backup_previous && path.is_file() {
        let backup = backup_path(path);
        fs::copy(path, &backup)?;
        info!(backup = %backup.display(), "Backed up previous artifact");
        Some(backup)
    } else {
        None
    };

    temp.persist(path).map_err(|err| StoreError::Io(err.error))?;
    fsync_dir(&parent)?;
    info!(path = %path.display(), entries = db.len(), "Published artifact");

    Ok(PublishedArtifact {
        path: path.to_path_buf(),
        backup,
    })
}

#[cfg(unix)]
fn fsync_dir(path: &Path) -> io::Result<()> {
    File::open(path)?.sync_all()
}

#[cfg(not(unix))]
fn fsync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}
