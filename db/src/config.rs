//! Build configuration for documentation databases.
//!
//! A [`BuildConfig`] names the source root, the namelists to extract and
//! their documents, the merge policy and the artifact location. Every field
//! is optional: an empty configuration describes the standard MESA layout
//! under `$MESA_DIR`.
//!
//! # Example YAML
//!
//! ```yaml
//! source_root: /opt/mesa-r15140
//! merge_policy: version_then_recency
//! backup_previous: true
//! namelists:
//!   - name: controls
//!     defaults:
//!       - star/defaults/controls.defaults
//!     declarations:
//!       - star/private/star_controls.inc
//!       - star/private/ctrls_io.f90
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use nldoc_core::{MergePolicy, SourceVersion, is_valid_name};
use nldoc_extract::{SourceDocument, SourceSet};
use serde::{Deserialize, Serialize};

use crate::error::{DatabaseError, Result};

/// Environment variable naming the default source root.
pub const MESA_DIR_ENV: &str = "MESA_DIR";
/// Artifact location relative to the source root.
pub const DEFAULT_ARTIFACT: &str = "data/mesa.db";
/// File holding the source version, relative to the source root.
pub const VERSION_FILE: &str = "data/version_number";
/// First numbered release whose `ctrls_io` module is free-form `.f90`.
pub const CTRLS_IO_F90_SINCE: u64 = 7380;

/// Documents making up one namelist. Relative paths are resolved against
/// the source root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamelistConfig {
    pub name: String,
    #[serde(default)]
    pub defaults: Vec<PathBuf>,
    #[serde(default)]
    pub declarations: Vec<PathBuf>,
}

impl NamelistConfig {
    fn new(name: &str, defaults: &str, declarations: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            defaults: vec![PathBuf::from(defaults)],
            declarations: declarations.iter().map(PathBuf::from).collect(),
        }
    }
}

/// The standard MESA `star` namelists for `version`.
///
/// Releases before [`CTRLS_IO_F90_SINCE`] ship `ctrls_io.f`; later and
/// non-numeric releases ship `ctrls_io.f90`.
///
/// # Examples
///
/// ```
/// use nldoc_core::SourceVersion;
/// use nldoc_db::mesa_namelists;
///
/// let old = mesa_namelists(&SourceVersion::new("7184"));
/// assert!(old[1].declarations[1].ends_with("ctrls_io.f"));
///
/// let new = mesa_namelists(&SourceVersion::new("r24.03.1"));
/// assert!(new[1].declarations[1].ends_with("ctrls_io.f90"));
/// ```
pub fn mesa_namelists(version: &SourceVersion) -> Vec<NamelistConfig> {
    let free_form = version
        .as_number()
        .is_none_or(|n| n >= CTRLS_IO_F90_SINCE);
    let ctrls_io = if free_form {
        "star/private/ctrls_io.f90"
    } else {
        "star/private/ctrls_io.f"
    };

    vec![
        NamelistConfig::new(
            "star_job",
            "star/defaults/star_job.defaults",
            &["star/private/star_job_controls.inc"],
        ),
        NamelistConfig::new(
            "controls",
            "star/defaults/controls.defaults",
            &["star/private/star_controls.inc", ctrls_io],
        ),
        NamelistConfig::new(
            "pgstar",
            "star/defaults/pgstar.defaults",
            &["star/private/pgstar_controls.inc"],
        ),
    ]
}

/// Reads the source root from `MESA_DIR`, ignoring an empty value.
pub fn source_root_from_env() -> Option<PathBuf> {
    std::env::var_os(MESA_DIR_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Configuration of one database build.
///
/// # Examples
///
/// ```
/// use nldoc_db::BuildConfig;
///
/// let config = BuildConfig::for_root("/opt/mesa");
/// assert!(config.artifact_path().unwrap().ends_with("data/mesa.db"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Root of the source tree; falls back to `$MESA_DIR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<PathBuf>,
    /// Source version; read from `data/version_number` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Namelists to extract; the standard MESA layout when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namelists: Vec<NamelistConfig>,
    #[serde(default)]
    pub merge_policy: MergePolicy,
    /// Artifact path; `<source root>/data/mesa.db` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
    /// Keep the previous artifact as `<stem>_old.<ext>`.
    #[serde(default)]
    pub backup_previous: bool,
}

impl BuildConfig {
    /// Standard layout rooted at `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: Some(root.into()),
            ..Self::default()
        }
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](DatabaseError::IoError) if the file cannot be
    /// read, [`YamlError`](DatabaseError::YamlError) if parsing fails, or
    /// [`InvalidConfig`](DatabaseError::InvalidConfig) if it fails
    /// [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](DatabaseError::IoError) if the file cannot be
    /// written, or [`YamlError`](DatabaseError::YamlError) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks namelist names and document lists.
    ///
    /// # Errors
    ///
    /// [`DatabaseError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for namelist in &self.namelists {
            if !is_valid_name(&namelist.name) {
                return Err(DatabaseError::InvalidConfig(format!(
                    "invalid namelist name `{}`",
                    namelist.name
                )));
            }
            if !seen.insert(namelist.name.to_lowercase()) {
                return Err(DatabaseError::InvalidConfig(format!(
                    "namelist `{}` is listed twice",
                    namelist.name
                )));
            }
            if namelist.defaults.is_empty() && namelist.declarations.is_empty() {
                return Err(DatabaseError::InvalidConfig(format!(
                    "namelist `{}` has no documents",
                    namelist.name
                )));
            }
        }
        if self.version.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(DatabaseError::InvalidConfig("empty version".to_string()));
        }
        Ok(())
    }

    /// The configured source root, or `$MESA_DIR`.
    ///
    /// # Errors
    ///
    /// [`DatabaseError::MissingSourceRoot`] if neither is set.
    pub fn resolve_root(&self) -> Result<PathBuf> {
        self.source_root
            .clone()
            .or_else(source_root_from_env)
            .ok_or(DatabaseError::MissingSourceRoot)
    }

    /// The configured version, or the contents of `data/version_number`.
    ///
    /// # Errors
    ///
    /// [`IoError`](DatabaseError::IoError) if the version file cannot be
    /// read, [`InvalidConfig`](DatabaseError::InvalidConfig) if it is empty.
    pub fn source_version(&self, root: &Path) -> Result<SourceVersion> {
        let raw = match &self.version {
            Some(version) => version.clone(),
            None => std::fs::read_to_string(root.join(VERSION_FILE))?,
        };
        let version = SourceVersion::new(raw);
        if version.as_str().is_empty() {
            return Err(DatabaseError::InvalidConfig(format!(
                "empty version in {}",
                root.join(VERSION_FILE).display()
            )));
        }
        Ok(version)
    }

    /// Source sets for every configured namelist, in order.
    ///
    /// # Errors
    ///
    /// As [`resolve_root`](Self::resolve_root) and
    /// [`source_version`](Self::source_version).
    pub fn source_sets(&self) -> Result<Vec<SourceSet>> {
        let root = self.resolve_root()?;
        let version = self.source_version(&root)?;
        let namelists = if self.namelists.is_empty() {
            mesa_namelists(&version)
        } else {
            self.namelists.clone()
        };

        Ok(namelists
            .into_iter()
            .map(|namelist| {
                let mut set = SourceSet::new(namelist.name, version.clone());
                for path in namelist.declarations {
                    set = set.with_document(SourceDocument::declarations_file(root.join(path)));
                }
                for path in namelist.defaults {
                    set = set.with_document(SourceDocument::defaults_file(root.join(path)));
                }
                set
            })
            .collect())
    }

    /// The artifact path: explicit, or `<source root>/data/mesa.db`.
    ///
    /// # Errors
    ///
    /// [`DatabaseError::MissingSourceRoot`] when no path is configured and
    /// no root is known.
    pub fn artifact_path(&self) -> Result<PathBuf> {
        match &self.artifact {
            Some(path) => Ok(path.clone()),
            None => Ok(self.resolve_root()?.join(DEFAULT_ARTIFACT)),
        }
    }
}
