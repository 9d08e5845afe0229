//! `SourceControl` backed by the git command line.
//!
//! kiln runs as root inside a checkout owned by the service user, so every
//! command inside the checkout marks it as a safe directory.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, Divergence, SourceControl};
use crate::infra::command_runner::{
    DEFAULT_CMD_TIMEOUT, NETWORK_GIT_TIMEOUT, run_checked, run_checked_as,
};

pub struct GitCli<R> {
    runner: R,
}

impl<R: CommandRunner> GitCli<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Run `git <args>` inside `dir` and return stdout without the trailing
    /// newline. Leading whitespace is significant in porcelain output.
    async fn git_in(&self, dir: &Path, args: &[&str], timeout: Duration) -> Result<String> {
        let dir = dir.display().to_string();
        let safe = format!("safe.directory={dir}");
        let label = format!("git {}", args.first().copied().unwrap_or_default());
        let mut full = vec!["-C", dir.as_str(), "-c", safe.as_str()];
        full.extend_from_slice(args);
        let output = run_checked_as(&self.runner, &label, "git", &full, timeout).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}

impl<R: CommandRunner> SourceControl for GitCli<R> {
    async fn clone_branch(&self, repo: &str, branch: &str, dest: &Path) -> Result<()> {
        let dest = dest.display().to_string();
        run_checked(
            &self.runner,
            "git",
            &["clone", "--branch", branch, "--", repo, &dest],
            NETWORK_GIT_TIMEOUT,
        )
        .await
        .with_context(|| format!("cloning {repo} ({branch})"))?;
        Ok(())
    }

    async fn set_origin(&self, dir: &Path, repo: &str) -> Result<()> {
        self.git_in(dir, &["remote", "set-url", "origin", repo], DEFAULT_CMD_TIMEOUT)
            .await
            .context("updating origin URL")?;
        Ok(())
    }

    async fn fetch_all(&self, dir: &Path) -> Result<()> {
        self.git_in(dir, &["fetch", "--all", "--prune"], NETWORK_GIT_TIMEOUT)
            .await
            .context("fetching remotes")?;
        Ok(())
    }

    async fn divergence(&self, dir: &Path, branch: &str) -> Result<Divergence> {
        let range = format!("origin/{branch}..HEAD");
        let log = self
            .git_in(dir, &["log", "--format=%h %s", &range], DEFAULT_CMD_TIMEOUT)
            .await
            .with_context(|| format!("listing commits not on origin/{branch}"))?;
        let status = self
            .git_in(
                dir,
                &["status", "--porcelain", "--untracked-files=no"],
                DEFAULT_CMD_TIMEOUT,
            )
            .await
            .context("listing modified files")?;
        Ok(Divergence {
            local_commits: log.lines().map(str::to_owned).collect(),
            modified_files: parse_porcelain(&status),
        })
    }

    async fn hard_reset(&self, dir: &Path, branch: &str) -> Result<()> {
        let remote = format!("origin/{branch}");
        self.git_in(
            dir,
            &["checkout", "--force", "-B", branch, &remote],
            DEFAULT_CMD_TIMEOUT,
        )
        .await
        .with_context(|| format!("checking out {remote}"))?;
        self.git_in(dir, &["reset", "--hard", &remote], DEFAULT_CMD_TIMEOUT)
            .await
            .with_context(|| format!("resetting to {remote}"))?;
        Ok(())
    }

    async fn head_commit(&self, dir: &Path) -> Result<String> {
        self.git_in(dir, &["rev-parse", "HEAD"], DEFAULT_CMD_TIMEOUT)
            .await
            .context("reading HEAD")
    }
}

/// Paths from `git status --porcelain` (v1) output.
fn parse_porcelain(status: &str) -> Vec<String> {
    status
        .lines()
        .filter_map(|line| line.get(3..))
        .map(|path| match path.split_once(" -> ") {
            Some((_, renamed)) => renamed.to_string(),
            None => path.to_string(),
        })
        .collect()
}
