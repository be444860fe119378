//! Module command - one module and the repository it is built from

use super::{resolve_target, Backends};
use crate::cli::args::{ModuleArgs, OutputFormat};
use crate::cli::render;
use crate::config::{Config, ConfigManager, ModuleLookup};
use crate::error::BuildbarResult;
use crate::git::RepoStatus;
use crate::state::BuildStateCache;
use crate::status::ModuleReport;
use console::style;
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct ModuleDetail {
    module: ModuleReport,
    repo: Option<RepoStatus>,
}

/// Execute the module command
pub async fn execute(args: ModuleArgs, config: &Config) -> BuildbarResult<()> {
    // Unknown modules are a configuration error, not an `error` status
    let module = config.lookup(&args.name)?;
    let target = resolve_target(args.platform.as_deref(), config);
    if !module.builds_for(&target.platform) {
        info!("Module {} does not list {} as a target", args.name, target.platform);
    }

    let backends = Backends::new(config);
    let aggregator = backends.aggregator(config, args.no_fetch);

    let path = BuildStateCache::path_for(&ConfigManager::state_dir(config), &target);
    let mut cache = BuildStateCache::load(path, target.clone());
    let report = aggregator.report(&args.name, &target, &mut cache);
    cache.save()?;

    let repo = match module.repos {
        Some(ref name) => Some(aggregator.repo(name).await?),
        None => None,
    };

    let detail = ModuleDetail {
        module: report,
        repo,
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&detail)?),
        OutputFormat::Plain => {
            println!("{} {}", detail.module.status, detail.module.name);
            if let Some(ref repo) = detail.repo {
                render::print_repos_plain(std::slice::from_ref(repo));
            }
        }
        OutputFormat::Table => {
            println!(
                "{} {} {}",
                style(&detail.module.name).bold(),
                style(&target).cyan(),
                render::module_status(detail.module.status)
            );
            if let Some(ref error) = detail.module.error {
                println!("  {}", style(error).red());
            }
            match detail.repo {
                Some(ref repo) => render::print_repos_table(std::slice::from_ref(repo)),
                None => println!("  {}", style("Vendored, no repository").dim()),
            }
        }
    }

    Ok(())
}
