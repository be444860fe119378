//! CLI command implementations

pub mod cache;
pub mod completions;
pub mod config;
pub mod module;
pub mod modules;
pub mod repos;
pub mod status;

pub use cache::execute as cache;
pub use completions::execute as completions;
pub use config::execute as config;
pub use module::execute as module;
pub use modules::execute as modules;
pub use repos::execute as repos;
pub use status::execute as status;

use crate::config::{Config, ConfigManager};
use crate::engine::ModuleStatusEngine;
use crate::fingerprint::SourceTreeFingerprint;
use crate::git::{FreshnessProbe, GitCli};
use crate::status::StatusAggregator;
use crate::target::BuildTarget;
use std::time::Duration;

/// Concrete collaborators shared by the status commands
pub(crate) struct Backends {
    fingerprints: SourceTreeFingerprint,
    git: GitCli,
}

impl Backends {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            fingerprints: SourceTreeFingerprint::new(
                ConfigManager::repos_dir(config),
                config.fingerprint.ignore.clone(),
            ),
            git: GitCli::new(Duration::from_secs(config.probe.timeout_secs)),
        }
    }

    /// Build an aggregator; `no_fetch` overrides `probe.fetch`
    pub(crate) fn aggregator<'a>(&'a self, config: &'a Config, no_fetch: bool) -> StatusAggregator<'a> {
        let engine = ModuleStatusEngine::new(config, &self.fingerprints);
        let probe = FreshnessProbe::new(
            &self.git,
            ConfigManager::repos_dir(config),
            config.probe.fetch && !no_fetch,
        )
        .with_timeout(Duration::from_secs(config.probe.timeout_secs));
        StatusAggregator::new(config, engine, probe)
    }
}

/// Target for an explicit platform or the configured default
pub(crate) fn resolve_target(platform: Option<&str>, config: &Config) -> BuildTarget {
    BuildTarget::new(platform.unwrap_or(&config.general.default_platform))
}
