//! Buildbar - build freshness at a glance
//!
//! CLI entry point that dispatches to subcommands.

use buildbar::cli::{Cli, Commands};
use buildbar::config::{Config, ConfigManager};
use buildbar::error::{BuildbarError, BuildbarResult};
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a full tracing filter directive
const LOG_ENV: &str = "BUILDBAR_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> BuildbarResult<()> {
    let cli = Cli::parse();

    // Completions don't need config loading
    if let Commands::Completions(args) = cli.command {
        buildbar::cli::commands::completions(args);
        return Ok(());
    }

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| BuildbarError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    init_logging(cli.verbose, &config);
    match local_config_path {
        Some(ref path) => debug!("Merged local config: {}", path.display()),
        None if cli.no_local => debug!("Local config discovery disabled (--no-local)"),
        None => {}
    }

    match cli.command {
        Commands::Completions(_) => unreachable!("Completions handled above"),
        Commands::Status(args) => buildbar::cli::commands::status(args, &config).await,
        Commands::Modules(args) => buildbar::cli::commands::modules(args, &config).await,
        Commands::Repos(args) => buildbar::cli::commands::repos(args, &config).await,
        Commands::Module(args) => buildbar::cli::commands::module(args, &config).await,
        Commands::Cache(args) => buildbar::cli::commands::cache(args, &config).await,
        Commands::Config(args) => {
            buildbar::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// Logs go to stderr: 0 = warn, 1 = info, 2+ = debug, unless BUILDBAR_LOG is set
fn init_logging(verbose: u8, config: &Config) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("buildbar=warn"),
        1 => EnvFilter::new("buildbar=info"),
        _ => EnvFilter::new("buildbar=debug"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
