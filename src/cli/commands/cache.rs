//! Cache command - inspect or reset the build-state cache

use super::resolve_target;
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::{Config, ConfigManager};
use crate::error::BuildbarResult;
use crate::fingerprint::Fingerprint;
use crate::state::BuildStateCache;
use crate::target::BuildTarget;
use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

#[derive(Serialize)]
struct CacheListing<'a> {
    target: &'a BuildTarget,
    path: &'a Path,
    updated_at: Option<DateTime<Utc>>,
    modules: BTreeMap<&'a str, &'a Fingerprint>,
}

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> BuildbarResult<()> {
    let state_dir = ConfigManager::state_dir(config);

    match args.action {
        CacheAction::Show { platform, format } => {
            let target = resolve_target(platform.as_deref(), config);
            let cache = BuildStateCache::load(BuildStateCache::path_for(&state_dir, &target), target);
            show(&cache, format)?;
        }
        CacheAction::Path { platform } => {
            let target = resolve_target(platform.as_deref(), config);
            println!("{}", BuildStateCache::path_for(&state_dir, &target).display());
        }
        CacheAction::Clear { platform, module } => {
            let target = resolve_target(platform.as_deref(), config);
            let mut cache =
                BuildStateCache::load(BuildStateCache::path_for(&state_dir, &target), target);
            clear(&mut cache, module.as_deref())?;
        }
    }

    Ok(())
}

fn show(cache: &BuildStateCache, format: OutputFormat) -> BuildbarResult<()> {
    match format {
        OutputFormat::Json => {
            let listing = CacheListing {
                target: cache.target(),
                path: cache.path(),
                updated_at: cache.updated_at(),
                modules: cache.entries().collect(),
            };
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        OutputFormat::Plain => {
            for (module, fingerprint) in cache.entries() {
                println!("{} {}", module, fingerprint);
            }
        }
        OutputFormat::Table => {
            if cache.is_empty() {
                println!("No fingerprints recorded for {}", style(cache.target()).cyan());
                return Ok(());
            }
            println!("{:<28} {}", style("MODULE").bold(), style("FINGERPRINT").bold());
            for (module, fingerprint) in cache.entries() {
                println!("{:<28} {}", module, style(fingerprint.short()).dim());
            }
            if let Some(updated_at) = cache.updated_at() {
                println!();
                println!(
                    "{} entries, updated {}",
                    cache.len(),
                    updated_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
        }
    }
    Ok(())
}

fn clear(cache: &mut BuildStateCache, module: Option<&str>) -> BuildbarResult<()> {
    match module {
        Some(name) => {
            if cache.remove(name).is_none() {
                warn!("No fingerprint recorded for {}", name);
                return Ok(());
            }
            cache.save()?;
            println!("{} Forgot {}", style("✓").green().bold(), name);
        }
        None => {
            let count = cache.len();
            cache.clear();
            cache.save()?;
            println!(
                "{} Cleared {} entries for {}",
                style("✓").green().bold(),
                count,
                style(cache.target()).cyan()
            );
        }
    }
    Ok(())
}
