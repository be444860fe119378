//! Status command - modules and repositories for a platform

use super::{resolve_target, Backends};
use crate::cli::args::{OutputFormat, StatusArgs};
use crate::cli::render;
use crate::config::{Config, ConfigManager};
use crate::error::BuildbarResult;

/// Execute the status command
pub async fn execute(args: StatusArgs, config: &Config) -> BuildbarResult<()> {
    let target = resolve_target(args.platform.as_deref(), config);
    let backends = Backends::new(config);
    let aggregator = backends.aggregator(config, args.no_fetch);

    let summary = aggregator
        .summarize(&target, &ConfigManager::state_dir(config))
        .await?;

    match args.format {
        OutputFormat::Table => {
            render::print_modules_table(&summary.modules);
            render::print_repos_table(&summary.repos);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Plain => {
            render::print_modules_plain(&summary.modules);
            render::print_repos_plain(&summary.repos);
        }
    }

    Ok(())
}
