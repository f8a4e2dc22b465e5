//! Building and loading namelist documentation databases.
//!
//! This crate ties extraction, merging and storage together:
//!
//! - [`DatabaseBuilder`] extracts source sets, merges duplicates and
//!   publishes an artifact atomically, returning a [`BuildReport`].
//! - [`load`] and [`load_default`] read an artifact back into a fully
//!   indexed [`Database`](nldoc_core::Database).
//! - [`BuildConfig`] describes a build in YAML and knows the standard MESA
//!   source layout.
//!
//! # Quick start
//!
//! ```no_run
//! use nldoc_core::QueryEngine;
//! use nldoc_db::{BuildConfig, DatabaseBuilder, load};
//!
//! let config = BuildConfig::for_root("/opt/mesa");
//! let report = DatabaseBuilder::from_config(&config).unwrap().build().unwrap();
//! println!("{report}");
//!
//! let db = load(config.artifact_path().unwrap()).unwrap();
//! let query = QueryEngine::new(&db);
//! println!("{}", query.default("initial_mass").unwrap());
//! ```

mod builder;
mod config;
mod error;
mod loader;
mod report;

pub use builder::DatabaseBuilder;
pub use config::{
    BuildConfig, CTRLS_IO_F90_SINCE, DEFAULT_ARTIFACT, MESA_DIR_ENV, NamelistConfig, VERSION_FILE,
    mesa_namelists, source_root_from_env,
};
pub use error::{DatabaseError, Result};
pub use loader::{default_artifact_path, load, load_default};
pub use report::BuildReport;
