//! Build targets: a platform plus the architecture it cross-compiles for

use serde::{Deserialize, Serialize};
use std::fmt;

/// Architecture used for a platform, if the platform has a fixed one
pub fn architecture_for(platform: &str) -> Option<&'static str> {
    match platform {
        "ios" => Some("arm64"),
        "android" => Some("armeabi-v7a"),
        _ => None,
    }
}

/// A (platform, architecture) pair
///
/// Every fingerprint and every build-state cache is scoped to one target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildTarget {
    /// Lower-cased platform name
    pub platform: String,

    /// Architecture, `None` for platforms without a fixed one
    pub arch: Option<String>,
}

impl BuildTarget {
    /// Create a target for `platform`, deriving its architecture
    pub fn new(platform: &str) -> Self {
        let platform = platform.to_ascii_lowercase();
        let arch = architecture_for(&platform).map(str::to_string);
        Self { platform, arch }
    }

    /// Stable file-name stem for this target, e.g. `ios-arm64`
    pub fn slug(&self) -> String {
        format!("{}-{}", self.platform, self.arch.as_deref().unwrap_or("noarch"))
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arch {
            Some(ref arch) => write!(f, "{}/{}", self.platform, arch),
            None => write!(f, "{}", self.platform),
        }
    }
}
