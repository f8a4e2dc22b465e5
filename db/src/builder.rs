//! Database construction from source sets.
//!
//! [`DatabaseBuilder`] drives one build: extract every source set, merge
//! same-named candidates under a [`MergePolicy`], validate, and either
//! return the [`Database`] ([`build_in_memory`](DatabaseBuilder::build_in_memory))
//! or publish it as an artifact ([`build`](DatabaseBuilder::build)).
//!
//! # Example
//!
//! ```
//! use nldoc_db::DatabaseBuilder;
//! use nldoc_extract::{SourceDocument, SourceSet};
//!
//! let set = SourceSet::new("controls", "v1").with_document(SourceDocument::defaults_text(
//!     "controls.defaults",
//!     "! ### FOO\n! Controls foo.\nFOO = 0\n",
//! ));
//!
//! let dir = tempfile::tempdir().unwrap();
//! let report = DatabaseBuilder::new()
//!     .with_source_set(set)
//!     .with_output(dir.path().join("mesa.db"))
//!     .build()
//!     .unwrap();
//! assert_eq!(report.entries, 1);
//! ```

use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use nldoc_core::{Database, Entry, MergePolicy, merge_entries};
use nldoc_extract::{ExtractionWarning, SourceSet, WarningKind, extract};
use nldoc_sqlite::{WriteOptions, write_artifact};
use tracing::{info, warn};

use crate::config::{BuildConfig, DEFAULT_ARTIFACT, source_root_from_env};
use crate::error::{DatabaseError, Result};
use crate::report::BuildReport;

/// Configures and runs one database build.
#[derive(Debug, Clone, Default)]
pub struct DatabaseBuilder {
    sets: Vec<SourceSet>,
    policy: MergePolicy,
    output: Option<PathBuf>,
    backup_previous: bool,
    generated_at: Option<String>,
}

impl DatabaseBuilder {
    /// Creates a builder with no sources and the default merge policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from a [`BuildConfig`].
    ///
    /// # Errors
    ///
    /// As [`BuildConfig::source_sets`] and [`BuildConfig::artifact_path`].
    pub fn from_config(config: &BuildConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new()
            .with_source_sets(config.source_sets()?)
            .with_merge_policy(config.merge_policy)
            .with_output(config.artifact_path()?)
            .with_backup_previous(config.backup_previous))
    }

    /// Appends one source set. Later sets are more recent.
    pub fn with_source_set(mut self, set: SourceSet) -> Self {
        self.sets.push(set);
        self
    }

    /// Appends several source sets in order.
    pub fn with_source_sets(mut self, sets: impl IntoIterator<Item = SourceSet>) -> Self {
        self.sets.extend(sets);
        self
    }

    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the artifact path. Without one, [`build`](Self::build) writes
    /// to `$MESA_DIR/data/mesa.db`.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn with_backup_previous(mut self, backup: bool) -> Self {
        self.backup_previous = backup;
        self
    }

    /// Fixes the recorded build timestamp instead of using the clock.
    pub fn with_generated_at(mut self, timestamp: impl Into<String>) -> Self {
        self.generated_at = Some(timestamp.into());
        self
    }

    /// Builds the database without persisting it.
    ///
    /// # Errors
    ///
    /// [`DatabaseError::NoEntriesExtracted`] if the sources yield nothing.
    pub fn build_in_memory(&self) -> Result<(Database, BuildReport)> {
        let mut extraction = extract(self.sets.iter().cloned());
        let candidates: Vec<Entry> = extraction.by_ref().collect();
        let summary = extraction.finish();
        let extracted = candidates.len();

        let outcome = merge_entries(candidates, self.policy);
        let mut warnings = summary.warnings;
        for replaced in &outcome.overrides {
            warn!("{replaced}");
            warnings.push(
                ExtractionWarning::new(
                    WarningKind::Superseded,
                    replaced.superseded_origin.clone(),
                    format!(
                        "version {} replaced by version {} from {}",
                        replaced.superseded_version, replaced.kept_version, replaced.kept_origin
                    ),
                )
                .for_name(replaced.superseded_name.clone()),
            );
        }

        if outcome.entries.is_empty() {
            return Err(DatabaseError::NoEntriesExtracted);
        }

        let generated_at = self
            .generated_at
            .clone()
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        let db = Database::from_entries(outcome.entries, generated_at)?;

        let report = BuildReport {
            artifact: None,
            backup: None,
            source_version: db.info().source_version.clone(),
            extracted,
            skipped: summary.skipped,
            superseded: outcome.overrides.len(),
            entries: db.len(),
            warnings,
        };
        info!(
            entries = report.entries,
            superseded = report.superseded,
            version = %report.source_version,
            "Database built"
        );
        Ok((db, report))
    }

    /// Builds the database and atomically publishes it.
    ///
    /// A failed build leaves any previous artifact untouched.
    ///
    /// # Errors
    ///
    /// [`DatabaseError::NoEntriesExtracted`] if the sources yield nothing,
    /// [`DatabaseError::MissingSourceRoot`] if no output path is known, or
    /// [`DatabaseError::Store`] if publishing fails.
    pub fn build(&self) -> Result<BuildReport> {
        let output = match &self.output {
            Some(path) => path.clone(),
            None => source_root_from_env()
                .ok_or(DatabaseError::MissingSourceRoot)?
                .join(DEFAULT_ARTIFACT),
        };

        let (db, mut report) = self.build_in_memory()?;
        let options = WriteOptions {
            backup_previous: self.backup_previous,
        };
        let published = write_artifact(&output, &db, &options)?;
        report.artifact = Some(published.path);
        report.backup = published.backup;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use nldoc_extract::SourceDocument;

    use super::*;

    fn text_set(namelist: &str, version: &str, defaults: &str) -> SourceSet {
        SourceSet::new(namelist, version)
            .with_document(SourceDocument::defaults_text(format!("{namelist}@{version}"), defaults))
    }

    #[test]
    fn test_overrides_become_superseded_warnings() {
        let builder = DatabaseBuilder::new()
            .with_source_set(text_set("controls", "v2", "! ### Baz\n! new\nBaz = 2\n"))
            .with_source_set(text_set("controls", "v1", "! ### BAZ\n! old\nBAZ = 1\n"));
        let (db, report) = builder.build_in_memory().unwrap();

        assert_eq!(db.len(), 1);
        assert_eq!(db.get("baz").unwrap().doc, "new");
        assert_eq!(report.extracted, 2);
        assert_eq!(report.superseded, 1);
        let warning = &report.warnings[0];
        assert_eq!(warning.kind, WarningKind::Superseded);
        assert_eq!(warning.origin, "controls@v1");
        assert_eq!(warning.name.as_deref(), Some("BAZ"));
    }

    #[test]
    fn test_policy_is_applied() {
        let builder = DatabaseBuilder::new()
            .with_source_set(text_set("a", "v2", "x = 2\n"))
            .with_source_set(text_set("b", "v1", "x = 1\n"))
            .with_merge_policy(MergePolicy::LastWins);
        let (db, _) = builder.build_in_memory().unwrap();
        assert_eq!(db.get("x").unwrap().default.to_string(), "1");
        assert_eq!(db.info().source_version.as_str(), "v1");
    }

    #[test]
    fn test_from_config_takes_every_configured_set() {
        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../extract/tests/fixtures/mesa");
        let config = BuildConfig {
            artifact: Some(PathBuf::from("out.db")),
            ..BuildConfig::for_root(root)
        };
        let builder = DatabaseBuilder::from_config(&config).unwrap();
        assert_eq!(builder.sets, config.source_sets().unwrap());
        assert_eq!(builder.output, Some(PathBuf::from("out.db")));
    }

    #[test]
    fn test_no_sources_is_fatal() {
        let result = DatabaseBuilder::new().build_in_memory();
        assert!(matches!(result, Err(DatabaseError::NoEntriesExtracted)));
    }

    #[test]
    fn test_only_malformed_records_is_fatal() {
        let builder = DatabaseBuilder::new().with_source_set(text_set("c", "1", "garbage line\n"));
        assert!(matches!(builder.build_in_memory(), Err(DatabaseError::NoEntriesExtracted)));
    }

    #[test]
    fn test_fixed_timestamp() {
        let builder = DatabaseBuilder::new()
            .with_source_set(text_set("c", "1", "a = 1\n"))
            .with_generated_at("2024-01-01T00:00:00Z");
        let (db, _) = builder.build_in_memory().unwrap();
        assert_eq!(db.info().generated_at, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_report_display() {
        let builder = DatabaseBuilder::new().with_source_set(text_set("c", "7", "a = 1\nb = 2\n"));
        let (_, report) = builder.build_in_memory().unwrap();
        assert_eq!(
            report.to_string(),
            "2 entries (version 7): 2 extracted, 0 skipped, 0 superseded, 0 warnings"
        );
    }
}
