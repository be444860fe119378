//! Repos command - freshness of source repositories

use super::Backends;
use crate::cli::args::{OutputFormat, ReposArgs};
use crate::cli::render;
use crate::config::Config;
use crate::error::BuildbarResult;

/// Execute the repos command
pub async fn execute(args: ReposArgs, config: &Config) -> BuildbarResult<()> {
    let backends = Backends::new(config);
    let aggregator = backends.aggregator(config, args.no_fetch);

    let platform = args.platform.map(|p| p.to_ascii_lowercase());
    let repos = if args.names.is_empty() {
        aggregator.repos(platform.as_deref()).await
    } else {
        aggregator.repos_named(&args.names).await?
    };

    match args.format {
        OutputFormat::Table => render::print_repos_table(&repos),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&repos)?),
        OutputFormat::Plain => render::print_repos_plain(&repos),
    }

    Ok(())
}
