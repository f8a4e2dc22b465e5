//! SQLite artifact storage for namelist documentation databases.
//!
//! A built [`Database`](nldoc_core::Database) is persisted as a single
//! SQLite file and loaded back wholesale. The crate is organized into four
//! modules:
//!
//! - **`schema`**: table layout and the `user_version` schema stamp
//! - **`convert`**: `Entry` to row conversion and back
//! - **`checksum`**: SHA-256 content hash stored alongside the rows
//! - **`artifact`**: atomic publish, backup and load
//!
//! # Example
//!
//! ```no_run
//! use nldoc_core::QueryEngine;
//! use nldoc_sqlite::read_artifact;
//!
//! let db = read_artifact("/opt/mesa/data/mesa.db").unwrap();
//! let query = QueryEngine::new(&db);
//! println!("{}", query.doc("initial_mass").unwrap());
//! ```

mod artifact;
mod checksum;
mod convert;
mod error;
mod schema;

pub use artifact::{
    PublishedArtifact, WriteOptions, backup_path, read_artifact, read_database, write_artifact,
    write_database,
};
pub use checksum::content_hash;
pub use error::{Result, StoreError};
pub use schema::SCHEMA_SQL;
