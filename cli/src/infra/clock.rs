//! `ClockSync` via systemd-timesyncd.

use anyhow::Result;

use crate::application::ports::{ClockSync, CommandRunner};
use crate::infra::command_runner::ensure_success;

pub struct Timedatectl<R> {
    runner: R,
}

impl<R: CommandRunner> Timedatectl<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> ClockSync for Timedatectl<R> {
    async fn sync(&self) -> Result<()> {
        let output = self.runner.run("timedatectl", &["set-ntp", "true"]).await?;
        ensure_success(&output, "timedatectl set-ntp")
    }
}
