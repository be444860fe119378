//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// buildbar - build freshness at a glance
///
/// Reports whether locally built modules are up to date with their sources
/// and whether their repositories are in sync with upstream.
#[derive(Parser, Debug)]
#[command(name = "buildbar")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "BUILDBAR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .buildbar.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Module and repository status for a platform
    Status(StatusArgs),

    /// Module build status for a platform
    Modules(ModulesArgs),

    /// Repository freshness
    Repos(ReposArgs),

    /// Status of a single module and its repository
    Module(ModuleArgs),

    /// Inspect or reset the build-state cache
    Cache(CacheArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Platform to check (defaults to general.default_platform)
    #[arg(short, long, env = "BUILDBAR_PLATFORM")]
    pub platform: Option<String>,

    /// Compare against the last fetched upstream without fetching
    #[arg(long)]
    pub no_fetch: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the modules command
#[derive(Parser, Debug)]
pub struct ModulesArgs {
    /// Platform to check (defaults to general.default_platform)
    #[arg(short, long, env = "BUILDBAR_PLATFORM")]
    pub platform: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the repos command
#[derive(Parser, Debug)]
pub struct ReposArgs {
    /// Only repositories used on this platform (default: all)
    #[arg(short, long)]
    pub platform: Option<String>,

    /// Compare against the last fetched upstream without fetching
    #[arg(long)]
    pub no_fetch: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Repositories to probe (default: every configured repository)
    pub names: Vec<String>,
}

/// Arguments for the module command
#[derive(Parser, Debug)]
pub struct ModuleArgs {
    /// Module name
    pub name: String,

    /// Platform to check (defaults to general.default_platform)
    #[arg(short, long, env = "BUILDBAR_PLATFORM")]
    pub platform: Option<String>,

    /// Compare against the last fetched upstream without fetching
    #[arg(long)]
    pub no_fetch: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List recorded fingerprints
    Show {
        /// Platform whose cache to show
        #[arg(short, long, env = "BUILDBAR_PLATFORM")]
        platform: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show the cache file path
    Path {
        /// Platform whose cache path to show
        #[arg(short, long, env = "BUILDBAR_PLATFORM")]
        platform: Option<String>,
    },

    /// Forget recorded fingerprints
    Clear {
        /// Platform whose cache to clear
        #[arg(short, long, env = "BUILDBAR_PLATFORM")]
        platform: Option<String>,

        /// Only forget this module
        #[arg(short, long)]
        module: Option<String>,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one item per line)
    Plain,
}
