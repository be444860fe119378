//! Configuration schema for buildbar
//!
//! Configuration is stored at `~/.config/buildbar/config.toml`

use crate::error::{BuildbarError, BuildbarResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Filesystem locations
    pub paths: PathsConfig,

    /// Repository freshness probe settings
    pub probe: ProbeConfig,

    /// Source fingerprint settings
    pub fingerprint: FingerprintConfig,

    /// Build modules keyed by name
    pub modules: BTreeMap<String, ModuleConfig>,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Platform used when no --platform is given
    pub default_platform: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            default_platform: "ios".to_string(),
        }
    }
}

/// Filesystem locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding one checkout per repository
    pub repos_dir: PathBuf,

    /// Override for the build-state directory
    pub state_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            repos_dir: PathBuf::from("~/devel"),
            state_dir: None,
        }
    }
}

/// Repository freshness probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Fetch from the remote before comparing against upstream
    pub fetch: bool,

    /// Time allowed for probing one repository, in seconds
    pub timeout_secs: u64,

    /// Repositories probed even when no module references them
    pub extra_repos: Vec<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            fetch: true,
            timeout_secs: 30,
            extra_repos: vec!["bundle".to_string()],
        }
    }
}

/// Source fingerprint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    /// File and directory names skipped while hashing sources
    pub ignore: Vec<String>,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            ignore: vec![
                ".git".to_string(),
                "build".to_string(),
                ".DS_Store".to_string(),
            ],
        }
    }
}

/// A single build module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Platforms this module builds for
    pub targets: Vec<String>,

    /// Repository the module is built from; absent for vendored modules
    pub repos: Option<String>,

    /// Explicit source directory, overriding the repository checkout
    pub source: Option<PathBuf>,
}

impl ModuleConfig {
    /// Whether the module builds for `platform` (case-insensitive)
    pub fn builds_for(&self, platform: &str) -> bool {
        self.targets.iter().any(|t| t.eq_ignore_ascii_case(platform))
    }

    /// Whether the module is backed by a tracked repository
    pub fn is_tracked(&self) -> bool {
        self.repos.is_some()
    }
}

/// Read-only access to the module table
pub trait ModuleLookup {
    /// Look up a module by name
    fn lookup(&self, name: &str) -> BuildbarResult<&ModuleConfig>;
}

impl ModuleLookup for Config {
    fn lookup(&self, name: &str) -> BuildbarResult<&ModuleConfig> {
        self.modules
            .get(name)
            .ok_or_else(|| BuildbarError::ModuleNotFound(name.to_string()))
    }
}

impl Config {
    /// Names of modules building for `platform`, tracked or vendored
    pub fn module_names(&self, platform: &str, tracked: bool) -> Vec<&str> {
        // BTreeMap keys are already sorted
        self.modules
            .iter()
            .filter(|(_, m)| m.builds_for(platform) && m.is_tracked() == tracked)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Distinct repositories to probe, sorted by name
    ///
    /// Includes every repository referenced by a module building for
    /// `platform` (or by any module when `platform` is `None`), plus
    /// `probe.extra_repos`.
    pub fn repo_names(&self, platform: Option<&str>) -> Vec<String> {
        let mut repos: BTreeSet<String> = self
            .modules
            .values()
            .filter(|m| platform.is_none_or(|p| m.builds_for(p)))
            .filter_map(|m| m.repos.clone())
            .collect();
        repos.extend(self.probe.extra_repos.iter().cloned());
        repos.into_iter().collect()
    }

    /// Fail unless `name` is a repository this configuration knows about
    pub fn ensure_repo(&self, name: &str) -> BuildbarResult<()> {
        let known = self.probe.extra_repos.iter().any(|r| r == name)
            || self
                .modules
                .values()
                .any(|m| m.repos.as_deref() == Some(name));
        if known {
            Ok(())
        } else {
            Err(BuildbarError::RepoNotConfigured(name.to_string()))
        }
    }
}
