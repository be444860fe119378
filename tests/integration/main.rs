//! Integration tests for buildbar

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use serde_json::Value;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Temp workspace with a config file, a repos dir and a state dir
    struct Workspace {
        temp: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let repos = temp.path().join("repos");
            fs::create_dir_all(repos.join("core-repo")).unwrap();
            fs::create_dir_all(repos.join("vendor-x")).unwrap();
            fs::write(repos.join("core-repo").join("lib.c"), "int core;\n").unwrap();
            fs::write(repos.join("vendor-x").join("x.h"), "#define X 1\n").unwrap();

            let config = format!(
                r#"
[paths]
repos_dir = "{repos}"
state_dir = "{state}"

[probe]
fetch = false
extra_repos = []

[modules.core-lib]
targets = ["ios", "android"]
repos = "core-repo"

[modules.vendor-x]
targets = ["ios"]

[modules.droid-only]
targets = ["android"]
repos = "droid-repo"
"#,
                repos = repos.display(),
                state = temp.path().join("state").display(),
            );
            fs::write(temp.path().join("config.toml"), config).unwrap();

            Self { temp }
        }

        fn path(&self) -> &Path {
            self.temp.path()
        }

        fn buildbar(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("buildbar");
            cmd.current_dir(self.path())
                .env_remove("BUILDBAR_STATE_DIR")
                .env_remove("BUILDBAR_PLATFORM")
                .env_remove("BUILDBAR_LOG")
                .arg("--no-local")
                .arg("--config")
                .arg(self.path().join("config.toml"));
            cmd
        }

        fn modules_json(&self) -> Value {
            let output = self
                .buildbar()
                .args(["modules", "-p", "ios", "--format", "json"])
                .output()
                .unwrap();
            assert!(output.status.success(), "{:?}", output);
            serde_json::from_slice(&output.stdout).unwrap()
        }
    }

    fn status_of<'a>(summary: &'a Value, group: &str, name: &str) -> &'a str {
        summary[group]
            .as_array()
            .unwrap()
            .iter()
            .find(|m| m["name"] == name)
            .and_then(|m| m["status"].as_str())
            .unwrap()
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("buildbar")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("build freshness at a glance"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("buildbar")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("buildbar"));
    }

    #[test]
    fn config_path_honors_flag() {
        let ws = Workspace::new();
        ws.buildbar()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_lists_modules() {
        let ws = Workspace::new();
        ws.buildbar()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("core-lib").and(predicate::str::contains("[paths]")));
    }

    #[test]
    fn modules_progress_from_unknown_to_up_to_date() {
        let ws = Workspace::new();

        let first = ws.modules_json();
        assert_eq!(first["module_count"], 2);
        assert_eq!(status_of(&first, "tracked", "core-lib"), "unknown");
        assert_eq!(status_of(&first, "vendored", "vendor-x"), "unknown");
        assert_eq!(first["health"], "degraded");

        let second = ws.modules_json();
        assert_eq!(status_of(&second, "tracked", "core-lib"), "up_to_date");
        assert_eq!(second["up_to_date_count"], 2);
        assert_eq!(second["health"], "all_up_to_date");
    }

    #[test]
    fn modules_detects_source_change() {
        let ws = Workspace::new();
        ws.modules_json();

        fs::write(
            ws.path().join("repos").join("core-repo").join("lib.c"),
            "int core = 2;\n",
        )
        .unwrap();

        let summary = ws.modules_json();
        assert_eq!(status_of(&summary, "tracked", "core-lib"), "out_of_date");
        assert_eq!(status_of(&summary, "vendored", "vendor-x"), "up_to_date");
        assert_eq!(summary["health"], "degraded");

        let settled = ws.modules_json();
        assert_eq!(status_of(&settled, "tracked", "core-lib"), "up_to_date");
    }

    #[test]
    fn modules_reports_missing_source_as_error() {
        let ws = Workspace::new();
        fs::remove_dir_all(ws.path().join("repos").join("vendor-x")).unwrap();

        let summary = ws.modules_json();
        assert_eq!(status_of(&summary, "vendored", "vendor-x"), "error");
        assert_eq!(status_of(&summary, "tracked", "core-lib"), "unknown");
    }

    #[test]
    fn cache_clear_resets_module() {
        let ws = Workspace::new();
        ws.modules_json();
        ws.modules_json();

        ws.buildbar()
            .args(["cache", "clear", "-p", "ios", "--module", "core-lib"])
            .assert()
            .success();

        let summary = ws.modules_json();
        assert_eq!(status_of(&summary, "tracked", "core-lib"), "unknown");
        assert_eq!(status_of(&summary, "vendored", "vendor-x"), "up_to_date");
    }

    #[test]
    fn cache_path_is_per_target() {
        let ws = Workspace::new();
        ws.buildbar()
            .args(["cache", "path", "-p", "android"])
            .assert()
            .success()
            .stdout(predicate::str::contains("android-armeabi-v7a.json"));
    }

    #[test]
    fn module_not_found() {
        let ws = Workspace::new();
        ws.buildbar()
            .args(["module", "nonexistent", "--no-fetch"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Module not found"));
    }

    #[test]
    fn repos_reports_missing_checkout() {
        let ws = Workspace::new();
        let output = ws
            .buildbar()
            .args(["repos", "--format", "json", "droid-repo"])
            .output()
            .unwrap();
        assert!(output.status.success(), "{:?}", output);

        let repos: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(repos[0]["name"], "droid-repo");
        assert_eq!(repos[0]["presence"], "missing");
        assert!(repos[0]["freshness"].is_null());
    }

    #[test]
    fn repos_rejects_unconfigured_name() {
        let ws = Workspace::new();
        ws.buildbar()
            .args(["repos", "not-a-repo"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not-a-repo"));
    }

    #[test]
    fn completions_generate() {
        cargo_bin_cmd!("buildbar")
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("buildbar"));
    }
}

mod git_tests {
    use buildbar::git::{Freshness, FreshnessProbe, GitCli};
    use std::fs;
    use std::path::Path;
    use std::process::Command;
    use std::time::Duration;
    use tempfile::TempDir;

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .current_dir(dir)
            .args(["-c", "commit.gpgsign=false"])
            .args(args)
            .env("GIT_AUTHOR_NAME", "Test")
            .env("GIT_AUTHOR_EMAIL", "test@example.com")
            .env("GIT_COMMITTER_NAME", "Test")
            .env("GIT_COMMITTER_EMAIL", "test@example.com")
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed in {}", args, dir.display());
    }

    fn commit(dir: &Path, file: &str) {
        fs::write(dir.join(file), file).unwrap();
        git(dir, &["add", file]);
        git(dir, &["commit", "-q", "-m", file]);
    }

    /// `origin.git` plus two clones: `work` (probed) and `other`
    fn setup(temp: &TempDir) {
        let seed = temp.path().join("seed");
        fs::create_dir_all(&seed).unwrap();
        git(&seed, &["init", "-q"]);
        commit(&seed, "README");
        git(temp.path(), &["clone", "-q", "--bare", "seed", "origin.git"]);
        git(temp.path(), &["clone", "-q", "origin.git", "work"]);
        git(temp.path(), &["clone", "-q", "origin.git", "other"]);
    }

    #[tokio::test]
    async fn probe_tracks_real_repository() {
        if !git_available() {
            eprintln!("git not available, skipping");
            return;
        }

        let temp = TempDir::new().unwrap();
        setup(&temp);
        let git_cli = GitCli::new(Duration::from_secs(30));
        let probe = FreshnessProbe::new(&git_cli, temp.path().to_path_buf(), true);

        let status = probe.probe("work").await;
        assert_eq!(status.freshness, Some(Freshness::Synced));
        assert!(!status.dirty);
        assert!(status.branch.is_some());

        commit(&temp.path().join("other"), "upstream.txt");
        git(&temp.path().join("other"), &["push", "-q"]);
        let status = probe.probe("work").await;
        assert_eq!(status.freshness, Some(Freshness::Behind));

        commit(&temp.path().join("work"), "local.txt");
        fs::write(temp.path().join("work").join("scratch.txt"), "wip").unwrap();
        let status = probe.probe("work").await;
        assert_eq!(status.freshness, Some(Freshness::Diverged));
        assert_eq!(status.freshness.map(Freshness::bits), Some(3));
        assert!(status.dirty);

        let missing = probe.probe("absent").await;
        assert!(missing.is_missing());
    }
}
