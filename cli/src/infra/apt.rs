//! `PackageManager` backed by apt on Debian-family hosts.

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, PackageManager};
use crate::infra::command_runner::{INSTALL_TIMEOUT, run_checked};

pub struct Apt<R> {
    runner: R,
}

impl<R: CommandRunner> Apt<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

/// Arguments for a non-interactive `apt-get` invocation via `env`.
fn apt_args<'a>(subcommand: &'a [&'a str], packages: &'a [&'a str]) -> Vec<&'a str> {
    let mut args = vec!["DEBIAN_FRONTEND=noninteractive", "apt-get"];
    args.extend_from_slice(subcommand);
    args.extend_from_slice(packages);
    args
}

impl<R: CommandRunner> PackageManager for Apt<R> {
    async fn install(&self, packages: &[&str]) -> Result<()> {
        run_checked(
            &self.runner,
            "env",
            &apt_args(&["update"], &[]),
            INSTALL_TIMEOUT,
        )
        .await
        .context("refreshing package indexes")?;
        run_checked(
            &self.runner,
            "env",
            &apt_args(&["install", "-y", "--no-install-recommends"], packages),
            INSTALL_TIMEOUT,
        )
        .await
        .with_context(|| format!("installing {}", packages.join(" ")))?;
        Ok(())
    }
}
