//! `RuntimeInstaller` backed by a Python virtual environment and pip.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, RuntimeInstaller};
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, INSTALL_TIMEOUT, run_checked};

pub struct Virtualenv<R> {
    runner: R,
}

impl<R: CommandRunner> Virtualenv<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    async fn pip(&self, env_dir: &Path, args: &[&str]) -> Result<()> {
        let pip = pip_path(env_dir).display().to_string();
        let mut full = vec!["install", "--disable-pip-version-check"];
        full.extend_from_slice(args);
        run_checked(&self.runner, &pip, &full, INSTALL_TIMEOUT).await?;
        Ok(())
    }
}

fn pip_path(env_dir: &Path) -> PathBuf {
    env_dir.join("bin").join("pip")
}

impl<R: CommandRunner> RuntimeInstaller for Virtualenv<R> {
    async fn create_env(&self, env_dir: &Path) -> Result<()> {
        let dir = env_dir.display().to_string();
        run_checked(
            &self.runner,
            "python3",
            &["-m", "venv", &dir],
            DEFAULT_CMD_TIMEOUT,
        )
        .await
        .with_context(|| format!("creating virtual environment {dir}"))?;
        Ok(())
    }

    async fn upgrade_installer(&self, env_dir: &Path) -> Result<()> {
        self.pip(env_dir, &["--upgrade", "pip"])
            .await
            .context("upgrading pip")
    }

    async fn install_manifest(&self, env_dir: &Path, manifest: &Path) -> Result<()> {
        let manifest = manifest.display().to_string();
        self.pip(env_dir, &["-r", &manifest])
            .await
            .with_context(|| format!("installing {manifest}"))
    }

    async fn install_packages(&self, env_dir: &Path, packages: &[&str]) -> Result<()> {
        self.pip(env_dir, packages)
            .await
            .with_context(|| format!("installing {}", packages.join(" ")))
    }
}
