//! Runner configuration.
//!
//! Controls where the geom binary lives, how long an invocation may take,
//! and which extra environment variables are set for it. Every field has a
//! default, so an empty file is a valid configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! geom_path: /sbin/geom
//! timeout_ms: 5000
//! env:
//!   TZ: UTC
//! ```

use std::collections::BTreeMap;
use std::env;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DiscoverError, Result};

/// Name of the geom executable searched for on `PATH`.
pub const GEOM_BINARY: &str = "geom";

/// Locations checked when geom is not on `PATH`.
pub const FALLBACK_DIRS: &[&str] = &["/sbin", "/usr/sbin"];

/// Default timeout for one geom invocation.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Environment forced on every invocation so output is not localized.
pub const LOCALE_ENV: &[(&str, &str)] = &[
    ("LANG", "C"),
    ("LC_ALL", "C"),
    ("LC_MESSAGES", "C"),
    ("LC_CTYPE", "C"),
];

/// Runner settings.
///
/// # Examples
///
/// ```
/// use geomscan_discovery::config::GeomConfig;
///
/// let config: GeomConfig = serde_yaml::from_str("timeout_ms: 2500").unwrap();
/// assert_eq!(config.timeout_ms, 2500);
/// assert!(config.geom_path.is_none());
/// assert!(config.command_env().iter().any(|(k, v)| k == "LC_ALL" && v == "C"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeomConfig {
    /// Explicit geom executable. `None` searches `PATH` then [`FALLBACK_DIRS`].
    pub geom_path: Option<PathBuf>,
    /// Milliseconds to wait for geom before killing it.
    pub timeout_ms: u64,
    /// Extra environment variables. Locale variables always win.
    pub env: BTreeMap<String, String>,
}

impl Default for GeomConfig {
    fn default() -> Self {
        Self {
            geom_path: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            env: BTreeMap::new(),
        }
    }
}

impl GeomConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](DiscoverError::Io) if the file cannot be read, or
    /// [`Yaml`](DiscoverError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Environment for a geom invocation: configured extras overlaid with
    /// the fixed locale variables.
    pub fn command_env(&self) -> Vec<(String, String)> {
        let mut merged = self.env.clone();
        for (key, value) in LOCALE_ENV {
            merged.insert((*key).to_string(), (*value).to_string());
        }
        merged.into_iter().collect()
    }

    /// Resolves the geom executable.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryNotFound`](DiscoverError::BinaryNotFound) when the
    /// configured path is not executable, or when no geom is found on
    /// `PATH` or in [`FALLBACK_DIRS`].
    pub fn resolve_binary(&self) -> Result<PathBuf> {
        if let Some(path) = &self.geom_path {
            if is_executable(path) {
                return Ok(path.clone());
            }
            return Err(DiscoverError::BinaryNotFound(path.display().to_string()));
        }

        let path_dirs = env::var_os("PATH")
            .map(|value| env::split_paths(&value).collect::<Vec<_>>())
            .unwrap_or_default();
        let candidates = path_dirs
            .into_iter()
            .chain(FALLBACK_DIRS.iter().map(PathBuf::from))
            .map(|dir| dir.join(GEOM_BINARY));

        for candidate in candidates {
            if is_executable(&candidate) {
                debug!(path = %candidate.display(), "Resolved geom binary");
                return Ok(candidate);
            }
        }

        Err(DiscoverError::BinaryNotFound(format!(
            "'{GEOM_BINARY}' is not on PATH or in {}",
            FALLBACK_DIRS.join(", ")
        )))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };

    metadata.is_file() && (metadata.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
