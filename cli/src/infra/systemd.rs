//! `ServiceSupervisor` backed by systemctl.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ServiceSupervisor};
use crate::infra::command_runner::ensure_success;

/// Where administrator-provided unit files live.
pub const SYSTEM_UNIT_DIR: &str = "/etc/systemd/system";

pub struct Systemctl<R> {
    runner: R,
    unit_dir: PathBuf,
}

impl<R: CommandRunner> Systemctl<R> {
    pub fn new(runner: R) -> Self {
        Self::with_unit_dir(runner, PathBuf::from(SYSTEM_UNIT_DIR))
    }

    pub fn with_unit_dir(runner: R, unit_dir: PathBuf) -> Self {
        Self { runner, unit_dir }
    }

    async fn systemctl(&self, args: &[&str]) -> Result<()> {
        let output = self.runner.run("systemctl", args).await?;
        ensure_success(&output, &format!("systemctl {}", args.join(" ")))
    }
}

impl<R: CommandRunner> ServiceSupervisor for Systemctl<R> {
    fn unit_path(&self, name: &str) -> PathBuf {
        self.unit_dir.join(format!("{name}.service"))
    }

    async fn reload(&self) -> Result<()> {
        self.systemctl(&["daemon-reload"]).await
    }

    async fn enable(&self, name: &str) -> Result<()> {
        self.systemctl(&["enable", name])
            .await
            .with_context(|| format!("enabling {name}"))
    }

    async fn restart(&self, name: &str) -> Result<()> {
        self.systemctl(&["restart", name])
            .await
            .with_context(|| format!("restarting {name}"))
    }

    async fn is_active(&self, name: &str) -> Result<bool> {
        // Non-zero exit means "not active", not a failure.
        let output = self
            .runner
            .run("systemctl", &["is-active", "--quiet", name])
            .await?;
        Ok(output.status.success())
    }
}
