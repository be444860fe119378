//! Status pass over all configured modules and repositories

use crate::config::Config;
use crate::engine::{ModuleStatus, ModuleStatusEngine};
use crate::error::{BuildbarError, BuildbarResult};
use crate::git::{FreshnessProbe, RepoStatus};
use crate::state::BuildStateCache;
use crate::target::BuildTarget;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

/// Coarse health of a platform's modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    /// Every module is up to date
    AllUpToDate,
    /// A strict majority is up to date
    Mostly,
    /// Half or fewer are up to date
    Degraded,
}

impl Health {
    pub fn classify(module_count: usize, up_to_date_count: usize) -> Self {
        if up_to_date_count == module_count {
            Self::AllUpToDate
        } else if up_to_date_count * 2 > module_count {
            Self::Mostly
        } else {
            Self::Degraded
        }
    }
}

/// Status of one module
#[derive(Debug, Clone, Serialize)]
pub struct ModuleReport {
    pub name: String,
    pub repos: Option<String>,
    pub status: ModuleStatus,
    /// Why the status is `error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Module statuses for one target
#[derive(Debug, Clone, Serialize)]
pub struct ModuleSummary {
    pub target: BuildTarget,
    /// Modules built from a tracked repository, sorted by name
    pub tracked: Vec<ModuleReport>,
    /// Vendored modules without a repository, sorted by name
    pub vendored: Vec<ModuleReport>,
    pub module_count: usize,
    pub up_to_date_count: usize,
    pub health: Health,
}

impl ModuleSummary {
    fn new(target: BuildTarget, tracked: Vec<ModuleReport>, vendored: Vec<ModuleReport>) -> Self {
        let module_count = tracked.len() + vendored.len();
        let up_to_date_count = tracked
            .iter()
            .chain(&vendored)
            .filter(|m| m.status == ModuleStatus::UpToDate)
            .count();
        Self {
            target,
            tracked,
            vendored,
            module_count,
            up_to_date_count,
            health: Health::classify(module_count, up_to_date_count),
        }
    }

    /// Every module, tracked ones first
    pub fn modules(&self) -> impl Iterator<Item = &ModuleReport> {
        self.tracked.iter().chain(&self.vendored)
    }
}

/// Result of a full status pass
#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    pub modules: ModuleSummary,
    pub repos: Vec<RepoStatus>,
}

/// Walks configured modules and repositories one after another
pub struct StatusAggregator<'a> {
    config: &'a Config,
    engine: ModuleStatusEngine<'a>,
    probe: FreshnessProbe<'a>,
}

impl<'a> StatusAggregator<'a> {
    pub fn new(
        config: &'a Config,
        engine: ModuleStatusEngine<'a>,
        probe: FreshnessProbe<'a>,
    ) -> Self {
        Self {
            config,
            engine,
            probe,
        }
    }

    /// Evaluate every module building for `target`
    ///
    /// A module whose evaluation fails is reported with status `error`; the
    /// remaining modules are still evaluated.
    pub fn modules(
        &self,
        target: &BuildTarget,
        cache: &mut BuildStateCache,
    ) -> BuildbarResult<ModuleSummary> {
        if cache.target() != target {
            return Err(BuildbarError::CacheScopeMismatch {
                expected: target.to_string(),
                found: cache.target().to_string(),
            });
        }

        let tracked = self.evaluate_all(target, cache, true);
        let vendored = self.evaluate_all(target, cache, false);
        let summary = ModuleSummary::new(target.clone(), tracked, vendored);

        info!(
            "{}: {}/{} modules up to date",
            target, summary.up_to_date_count, summary.module_count
        );
        Ok(summary)
    }

    fn evaluate_all(
        &self,
        target: &BuildTarget,
        cache: &mut BuildStateCache,
        tracked: bool,
    ) -> Vec<ModuleReport> {
        self.config
            .module_names(&target.platform, tracked)
            .into_iter()
            .map(|name| self.report(name, target, cache))
            .collect()
    }

    /// Evaluate a single module, turning failures into an `error` report
    pub fn report(
        &self,
        name: &str,
        target: &BuildTarget,
        cache: &mut BuildStateCache,
    ) -> ModuleReport {
        let repos = self
            .config
            .modules
            .get(name)
            .and_then(|m| m.repos.clone());

        match self.engine.evaluate(cache, name, target) {
            Ok(status) => ModuleReport {
                name: name.to_string(),
                repos,
                status,
                error: None,
            },
            Err(e) => {
                warn!("Evaluating module {} failed: {}", name, e);
                ModuleReport {
                    name: name.to_string(),
                    repos,
                    status: ModuleStatus::Error,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Probe every repository used on `platform` (or on any platform)
    pub async fn repos(&self, platform: Option<&str>) -> Vec<RepoStatus> {
        let names = self.config.repo_names(platform);
        self.probe_all(&names).await
    }

    /// Probe the named repositories, which must all be configured
    pub async fn repos_named(&self, names: &[String]) -> BuildbarResult<Vec<RepoStatus>> {
        for name in names {
            self.config.ensure_repo(name)?;
        }
        let names: Vec<String> = names
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Ok(self.probe_all(&names).await)
    }

    async fn probe_all(&self, names: &[String]) -> Vec<RepoStatus> {
        let mut statuses = Vec::with_capacity(names.len());
        for name in names {
            statuses.push(self.probe.probe(name).await);
        }
        statuses
    }

    /// Probe a single configured repository
    pub async fn repo(&self, name: &str) -> BuildbarResult<RepoStatus> {
        self.config.ensure_repo(name)?;
        Ok(self.probe.probe(name).await)
    }

    /// Full pass for `target`: modules, then repositories
    ///
    /// The build-state cache under `state_dir` is loaded once before the
    /// modules are evaluated and saved once afterwards.
    pub async fn summarize(
        &self,
        target: &BuildTarget,
        state_dir: &Path,
    ) -> BuildbarResult<StatusSummary> {
        let path = BuildStateCache::path_for(state_dir, target);
        let mut cache = BuildStateCache::load(path, target.clone());

        let modules = self.modules(target, &mut cache)?;
        cache.save()?;

        let repos = self.repos(Some(&target.platform)).await;
        Ok(StatusSummary { modules, repos })
    }
}
