//! Modules command - build status without touching git

use super::{resolve_target, Backends};
use crate::cli::args::{ModulesArgs, OutputFormat};
use crate::cli::render;
use crate::config::{Config, ConfigManager};
use crate::error::BuildbarResult;
use crate::state::BuildStateCache;

/// Execute the modules command
pub async fn execute(args: ModulesArgs, config: &Config) -> BuildbarResult<()> {
    let target = resolve_target(args.platform.as_deref(), config);
    let backends = Backends::new(config);
    let aggregator = backends.aggregator(config, true);

    let path = BuildStateCache::path_for(&ConfigManager::state_dir(config), &target);
    let mut cache = BuildStateCache::load(path, target.clone());
    let summary = aggregator.modules(&target, &mut cache)?;
    cache.save()?;

    match args.format {
        OutputFormat::Table => render::print_modules_table(&summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Plain => render::print_modules_plain(&summary),
    }

    Ok(())
}
