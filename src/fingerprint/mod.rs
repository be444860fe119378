//! Module fingerprints
//!
//! A fingerprint summarizes everything that determines a module's build
//! output for one target. Fingerprints are opaque: the only meaningful
//! operation is equality.

pub mod source;

pub use source::SourceTreeFingerprint;

use crate::config::ModuleConfig;
use crate::error::BuildbarResult;
use crate::target::BuildTarget;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, equality-comparable summary of a module's buildable state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap a precomputed fingerprint value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw fingerprint value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the current fingerprint of a module
///
/// Implementations must always do the full computation; a fingerprint is
/// never served from a cache or a quick check.
pub trait FingerprintProvider {
    /// Compute the fingerprint of `module` for `target`
    fn compute(
        &self,
        module: &str,
        config: &ModuleConfig,
        target: &BuildTarget,
    ) -> BuildbarResult<Fingerprint>;
}
