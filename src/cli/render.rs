//! Terminal rendering of status results

use crate::engine::ModuleStatus;
use crate::git::{Freshness, RepoStatus};
use crate::status::{Health, ModuleReport, ModuleSummary};
use console::{style, Emoji, StyledObject};

static SUNNY: Emoji<'_, '_> = Emoji("☀️  ", "");
static PARTLY: Emoji<'_, '_> = Emoji("⛅ ", "");
static CLOUDY: Emoji<'_, '_> = Emoji("☁️  ", "");

/// Styled label for a module status
pub fn module_status(status: ModuleStatus) -> StyledObject<String> {
    let label = status.to_string();
    match status {
        ModuleStatus::UpToDate => style(label).green(),
        ModuleStatus::OutOfDate => style(label).yellow(),
        ModuleStatus::Unknown => style(label).dim(),
        ModuleStatus::Error => style(label).red(),
    }
}

/// Styled label for repository freshness
pub fn freshness(repo: &RepoStatus) -> StyledObject<String> {
    match repo.freshness {
        None => style("missing".to_string()).red(),
        Some(f @ Freshness::Synced) => style(f.to_string()).green(),
        Some(f @ (Freshness::Behind | Freshness::Ahead)) => style(f.to_string()).yellow(),
        Some(f @ Freshness::Diverged) => style(f.to_string()).red(),
        Some(f @ Freshness::Unknown) => style(f.to_string()).dim(),
    }
}

fn working_tree(repo: &RepoStatus) -> StyledObject<&'static str> {
    if repo.is_missing() {
        style("-").dim()
    } else if repo.dirty {
        style("dirty").yellow()
    } else {
        style("clean").dim()
    }
}

/// One-line health headline, e.g. `ios/arm64 3/4 up to date`
pub fn headline(summary: &ModuleSummary) -> String {
    let icon = match summary.health {
        Health::AllUpToDate => SUNNY,
        Health::Mostly => PARTLY,
        Health::Degraded => CLOUDY,
    };
    let counts = format!(
        "{}/{} up to date",
        summary.up_to_date_count, summary.module_count
    );
    let counts = match summary.health {
        Health::AllUpToDate => style(counts).green(),
        Health::Mostly => style(counts).yellow(),
        Health::Degraded => style(counts).red(),
    };
    format!("{}{} {}", icon, style(&summary.target).bold().cyan(), counts)
}

fn print_module_rows(title: &str, modules: &[ModuleReport]) {
    if modules.is_empty() {
        return;
    }
    println!();
    println!("{}", style(title).bold());
    for module in modules {
        println!(
            "  {:<28} {:<12} {}",
            module.name,
            module_status(module.status),
            style(module.repos.as_deref().unwrap_or("")).dim()
        );
        if let Some(ref error) = module.error {
            println!("    {}", style(error).red());
        }
    }
}

/// Module table grouped by tracked and vendored modules
pub fn print_modules_table(summary: &ModuleSummary) {
    println!("{}", headline(summary));
    if summary.module_count == 0 {
        println!("  {}", style("No modules configured for this platform").dim());
        return;
    }
    print_module_rows("Tracked modules", &summary.tracked);
    print_module_rows("Vendored modules", &summary.vendored);
}

/// Repository table
pub fn print_repos_table(repos: &[RepoStatus]) {
    println!();
    println!("{}", style("Repositories").bold());
    if repos.is_empty() {
        println!("  {}", style("No repositories configured").dim());
        return;
    }
    for repo in repos {
        let branch = repo
            .branch
            .as_deref()
            .map(|b| format!("({})", b))
            .unwrap_or_default();
        println!(
            "  {:<28} {:<10} {:<7} {}",
            repo.name,
            freshness(repo),
            working_tree(repo),
            style(branch).dim()
        );
    }
}

pub fn print_modules_plain(summary: &ModuleSummary) {
    for module in summary.modules() {
        println!("{} {}", module.status, module.name);
    }
}

pub fn print_repos_plain(repos: &[RepoStatus]) {
    for repo in repos {
        let freshness = repo
            .freshness
            .map(|f| f.to_string())
            .unwrap_or_else(|| "missing".to_string());
        let tree = if repo.dirty { "dirty" } else { "clean" };
        println!(
            "{} {} {} {}",
            repo.name,
            freshness,
            tree,
            repo.branch.as_deref().unwrap_or("-")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Presence;
    use crate::target::BuildTarget;
    use std::path::PathBuf;

    fn summary(up: usize, total: usize) -> ModuleSummary {
        let reports = (0..total)
            .map(|i| ModuleReport {
                name: format!("m{}", i),
                repos: None,
                status: if i < up {
                    ModuleStatus::UpToDate
                } else {
                    ModuleStatus::OutOfDate
                },
                error: None,
            })
            .collect();
        ModuleSummary {
            target: BuildTarget::new("ios"),
            tracked: reports,
            vendored: vec![],
            module_count: total,
            up_to_date_count: up,
            health: Health::classify(total, up),
        }
    }

    #[test]
    fn headline_shows_counts_and_target() {
        let line = console::strip_ansi_codes(&headline(&summary(3, 4))).to_string();
        assert!(line.contains("ios/arm64"));
        assert!(line.contains("3/4 up to date"));
    }

    #[test]
    fn missing_repo_renders_as_missing() {
        let repo = RepoStatus::missing("core-repo", PathBuf::from("/x/core-repo"));
        let label = freshness(&repo).to_string();
        assert!(console::strip_ansi_codes(&label).contains("missing"));
    }

    #[test]
    fn printing_does_not_panic() {
        let repos = vec![RepoStatus {
            name: "core-repo".to_string(),
            path: PathBuf::from("/x/core-repo"),
            presence: Presence::Present,
            branch: Some("main".to_string()),
            freshness: Some(Freshness::Diverged),
            dirty: true,
        }];
        print_modules_table(&summary(1, 2));
        print_modules_plain(&summary(1, 2));
        print_repos_table(&repos);
        print_repos_plain(&repos);
    }
}
