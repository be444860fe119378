//! Module status engine
//!
//! Compares a module's current fingerprint with the one recorded in the
//! build-state cache and records the current one as a side effect.

use crate::config::ModuleLookup;
use crate::error::{BuildbarError, BuildbarResult};
use crate::fingerprint::{Fingerprint, FingerprintProvider};
use crate::state::BuildStateCache;
use crate::target::BuildTarget;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Build status of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    /// No fingerprint recorded yet
    Unknown,
    /// Sources changed since the last recorded fingerprint
    OutOfDate,
    /// Sources match the last recorded fingerprint
    UpToDate,
    /// The fingerprint could not be computed
    Error,
}

impl ModuleStatus {
    /// Classify `current` against the previously recorded fingerprint
    pub fn classify(expected: Option<&Fingerprint>, current: &Fingerprint) -> Self {
        match expected {
            None => Self::Unknown,
            Some(expected) if expected != current => Self::OutOfDate,
            Some(_) => Self::UpToDate,
        }
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::OutOfDate => "out_of_date",
            Self::UpToDate => "up_to_date",
            Self::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// Evaluates modules against a build-state cache
pub struct ModuleStatusEngine<'a> {
    modules: &'a dyn ModuleLookup,
    fingerprints: &'a dyn FingerprintProvider,
}

impl<'a> ModuleStatusEngine<'a> {
    /// Create an engine over a module table and a fingerprint provider
    pub fn new(modules: &'a dyn ModuleLookup, fingerprints: &'a dyn FingerprintProvider) -> Self {
        Self {
            modules,
            fingerprints,
        }
    }

    /// Evaluate `module` for `target`
    ///
    /// The cache entry is replaced by the freshly computed fingerprint
    /// whatever the outcome. Persisting the cache is left to the caller.
    /// Unknown modules and fingerprint failures are returned as errors and
    /// leave the cache untouched.
    pub fn evaluate(
        &self,
        cache: &mut BuildStateCache,
        module: &str,
        target: &BuildTarget,
    ) -> BuildbarResult<ModuleStatus> {
        let config = self.modules.lookup(module)?;

        if cache.target() != target {
            return Err(BuildbarError::CacheScopeMismatch {
                expected: target.to_string(),
                found: cache.target().to_string(),
            });
        }

        let expected = cache.get(module).cloned();
        let current = self.fingerprints.compute(module, config, target)?;
        let status = ModuleStatus::classify(expected.as_ref(), &current);

        debug!("Module {} on {} is {}", module, target, status);
        cache.set(module, current);
        Ok(status)
    }
}
