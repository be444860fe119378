//! Per-repository freshness probe

use crate::git::{Freshness, GitClient, Presence, RepoStatus};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Probes repository checkouts under a common base directory
pub struct FreshnessProbe<'a> {
    git: &'a dyn GitClient,
    repos_dir: PathBuf,
    fetch: bool,
    budget: Option<Duration>,
}

impl<'a> FreshnessProbe<'a> {
    /// Create a probe for checkouts living in `repos_dir`
    pub fn new(git: &'a dyn GitClient, repos_dir: PathBuf, fetch: bool) -> Self {
        Self {
            git,
            repos_dir,
            fetch,
            budget: None,
        }
    }

    /// Bound the time spent on one repository, all git commands included
    pub fn with_timeout(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Probe the repository `name`
    ///
    /// Never fails: a missing checkout is reported as such without running
    /// git, and git failures degrade the affected field.
    pub async fn probe(&self, name: &str) -> RepoStatus {
        let path = self.repos_dir.join(name);
        if !path.exists() {
            debug!("Repository {} not found at {}", name, path.display());
            return RepoStatus::missing(name, path);
        }

        match self.budget {
            Some(budget) => match timeout(budget, self.inspect(name, &path)).await {
                Ok(status) => status,
                Err(_) => {
                    warn!(
                        "Probing {} exceeded {}s, freshness unknown",
                        name,
                        budget.as_secs()
                    );
                    RepoStatus {
                        name: name.to_string(),
                        path: self.repos_dir.join(name),
                        presence: Presence::Present,
                        branch: None,
                        freshness: Some(Freshness::Unknown),
                        dirty: false,
                    }
                }
            },
            None => self.inspect(name, &path).await,
        }
    }

    async fn inspect(&self, name: &str, path: &Path) -> RepoStatus {
        let fetched = if self.fetch {
            match self.git.fetch(path).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Fetching {} failed: {}", name, e);
                    false
                }
            }
        } else {
            true
        };

        let branch = match self.git.current_branch(path).await {
            Ok(branch) => Some(branch),
            Err(e) => {
                warn!("Reading branch of {} failed: {}", name, e);
                None
            }
        };

        let freshness = if fetched {
            match self.git.divergence(path).await {
                Ok(divergence) => Freshness::from_divergence(divergence),
                Err(e) => {
                    debug!("No upstream comparison for {}: {}", name, e);
                    Freshness::Unknown
                }
            }
        } else {
            Freshness::Unknown
        };

        let dirty = match self.git.is_dirty(path).await {
            Ok(dirty) => dirty,
            Err(e) => {
                warn!("Reading working tree of {} failed: {}", name, e);
                false
            }
        };

        debug!(
            "Repository {}: {} {}",
            name,
            freshness,
            if dirty { "dirty" } else { "clean" }
        );

        RepoStatus {
            name: name.to_string(),
            path: path.to_path_buf(),
            presence: Presence::Present,
            branch,
            freshness: Some(freshness),
            dirty,
        }
    }
}
