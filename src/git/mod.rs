//! Repository freshness
//!
//! Freshness (relation to the upstream branch) and dirtiness (uncommitted
//! changes) are independent facts and are always reported as a pair.

mod client;
mod probe;

pub use client::GitCli;
pub use probe::FreshnessProbe;

#[cfg(test)]
pub(crate) use probe::tests::FakeGit;

use crate::error::BuildbarResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Git operations needed to probe a working copy
///
/// Every method runs against the working copy at `repo`.
#[async_trait]
pub trait GitClient: Send + Sync {
    /// Fetch from the default remote
    async fn fetch(&self, repo: &Path) -> BuildbarResult<()>;

    /// Name of the checked-out branch (`HEAD` when detached)
    async fn current_branch(&self, repo: &Path) -> BuildbarResult<String>;

    /// Commits ahead of and behind the upstream tracking branch
    async fn divergence(&self, repo: &Path) -> BuildbarResult<Divergence>;

    /// Whether the working tree has staged, unstaged or untracked changes
    async fn is_dirty(&self, repo: &Path) -> BuildbarResult<bool>;
}

/// Commit counts of a branch relative to its upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divergence {
    pub ahead: u32,
    pub behind: u32,
}

/// Relation of a local branch to its upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// Same commits as upstream
    Synced,
    /// Upstream has commits the local branch lacks
    Behind,
    /// Local branch has commits upstream lacks
    Ahead,
    /// Both ahead and behind
    Diverged,
    /// No upstream, or the comparison failed
    Unknown,
}

impl Freshness {
    pub const BEHIND_BIT: u8 = 1;
    pub const AHEAD_BIT: u8 = 2;
    pub const UNKNOWN_BIT: u8 = 8;

    pub fn from_divergence(divergence: Divergence) -> Self {
        match (divergence.ahead > 0, divergence.behind > 0) {
            (false, false) => Self::Synced,
            (false, true) => Self::Behind,
            (true, false) => Self::Ahead,
            (true, true) => Self::Diverged,
        }
    }

    /// Bitmask form: behind and ahead combine into diverged
    pub fn bits(self) -> u8 {
        match self {
            Self::Synced => 0,
            Self::Behind => Self::BEHIND_BIT,
            Self::Ahead => Self::AHEAD_BIT,
            Self::Diverged => Self::BEHIND_BIT | Self::AHEAD_BIT,
            Self::Unknown => Self::UNKNOWN_BIT,
        }
    }

    pub fn is_behind(self) -> bool {
        self.bits() & Self::BEHIND_BIT != 0
    }

    pub fn is_ahead(self) -> bool {
        self.bits() & Self::AHEAD_BIT != 0
    }
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Synced => "synced",
            Self::Behind => "behind",
            Self::Ahead => "ahead",
            Self::Diverged => "diverged",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Whether a repository checkout exists locally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Present,
    Missing,
}

/// Probed state of one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStatus {
    /// Repository name
    pub name: String,

    /// Local checkout path
    pub path: PathBuf,

    /// Whether the checkout exists
    pub presence: Presence,

    /// Checked-out branch, if it could be read
    pub branch: Option<String>,

    /// Relation to upstream; `None` when the checkout is missing
    pub freshness: Option<Freshness>,

    /// Uncommitted changes in the working tree
    pub dirty: bool,
}

impl RepoStatus {
    /// Status of a repository without a local checkout
    pub fn missing(name: &str, path: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            path,
            presence: Presence::Missing,
            branch: None,
            freshness: None,
            dirty: false,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.presence == Presence::Missing
    }
}
