//! Git client backed by the `git` executable

use crate::error::{BuildbarError, BuildbarResult};
use crate::git::{Divergence, GitClient};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Runs `git` as a subprocess inside the repository
///
/// Commands get the repository as their working directory; the process's
/// own current directory is never changed. Each command is killed once it
/// exceeds the configured timeout.
pub struct GitCli {
    timeout: Duration,
}

impl GitCli {
    /// Create a client with a per-command timeout
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Execute a git command in `repo` and return its trimmed stdout
    async fn exec(&self, repo: &Path, args: &[&str]) -> BuildbarResult<String> {
        let command = format!("git {}", args.join(" "));
        debug!("Executing in {}: {}", repo.display(), command);

        let output = Command::new("git")
            .args(args)
            .current_dir(repo)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = timeout(self.timeout, output)
            .await
            .map_err(|_| BuildbarError::CommandTimeout {
                command: command.clone(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|e| BuildbarError::command_failed(&command, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BuildbarError::command_exec(command, stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl GitClient for GitCli {
    async fn fetch(&self, repo: &Path) -> BuildbarResult<()> {
        self.exec(repo, &["fetch", "--quiet"]).await.map(|_| ())
    }

    async fn current_branch(&self, repo: &Path) -> BuildbarResult<String> {
        self.exec(repo, &["rev-parse", "--abbrev-ref", "HEAD"]).await
    }

    async fn divergence(&self, repo: &Path) -> BuildbarResult<Divergence> {
        let args = ["rev-list", "--left-right", "--count", "HEAD...@{upstream}"];
        let counts = self.exec(repo, &args).await?;
        parse_left_right(&counts).ok_or_else(|| {
            BuildbarError::command_exec(
                format!("git {}", args.join(" ")),
                format!("unexpected output: {}", counts),
            )
        })
    }

    async fn is_dirty(&self, repo: &Path) -> BuildbarResult<bool> {
        let status = self
            .exec(repo, &["status", "--porcelain", "--untracked-files=normal"])
            .await?;
        Ok(!status.is_empty())
    }
}

/// Parse `git rev-list --left-right --count` output: `<ahead>\t<behind>`
fn parse_left_right(output: &str) -> Option<Divergence> {
    let mut parts = output.split_whitespace();
    let ahead = parts.next()?.parse().ok()?;
    let behind = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Divergence { ahead, behind })
}
