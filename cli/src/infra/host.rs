//! The production host: this Linux machine, driven through its own tools.

use std::path::PathBuf;
use std::time::Duration;

use nix::unistd::{Uid, User};

use crate::application::ports::HostEnvironment;
use crate::infra::apt::Apt;
use crate::infra::clock::Timedatectl;
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, TokioCommandRunner};
use crate::infra::fs::LocalFs;
use crate::infra::git::GitCli;
use crate::infra::http::UreqHealthProbe;
use crate::infra::systemd::Systemctl;
use crate::infra::venv::Virtualenv;

pub struct LinuxHost {
    packages: Apt<TokioCommandRunner>,
    clock: Timedatectl<TokioCommandRunner>,
    fs: LocalFs,
    source: GitCli<TokioCommandRunner>,
    runtime: Virtualenv<TokioCommandRunner>,
    supervisor: Systemctl<TokioCommandRunner>,
    probe: UreqHealthProbe,
}

impl LinuxHost {
    /// Host whose unit files are written to `unit_dir`.
    #[must_use]
    pub fn new(unit_dir: PathBuf) -> Self {
        let runner = || TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT);
        Self {
            packages: Apt::new(runner()),
            clock: Timedatectl::new(runner()),
            fs: LocalFs,
            source: GitCli::new(runner()),
            runtime: Virtualenv::new(runner()),
            supervisor: Systemctl::with_unit_dir(runner(), unit_dir),
            probe: UreqHealthProbe::default(),
        }
    }

    /// Override the per-request health probe timeout.
    #[must_use]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe = UreqHealthProbe::new(timeout);
        self
    }
}

impl HostEnvironment for LinuxHost {
    type Packages = Apt<TokioCommandRunner>;
    type Clock = Timedatectl<TokioCommandRunner>;
    type Fs = LocalFs;
    type Source = GitCli<TokioCommandRunner>;
    type Runtime = Virtualenv<TokioCommandRunner>;
    type Supervisor = Systemctl<TokioCommandRunner>;
    type Probe = UreqHealthProbe;

    fn packages(&self) -> &Self::Packages {
        &self.packages
    }
    fn clock(&self) -> &Self::Clock {
        &self.clock
    }
    fn fs(&self) -> &Self::Fs {
        &self.fs
    }
    fn source(&self) -> &Self::Source {
        &self.source
    }
    fn runtime(&self) -> &Self::Runtime {
        &self.runtime
    }
    fn supervisor(&self) -> &Self::Supervisor {
        &self.supervisor
    }
    fn probe(&self) -> &Self::Probe {
        &self.probe
    }
}

/// The user who invoked kiln, seen through `sudo` when present.
///
/// `SUDO_USER`, then `USER`, then the account of the real uid.
#[must_use]
pub fn invoking_user() -> Option<String> {
    invoking_user_from(
        std::env::var("SUDO_USER").ok(),
        std::env::var("USER").ok(),
    )
}

fn invoking_user_from(sudo_user: Option<String>, user: Option<String>) -> Option<String> {
    sudo_user
        .filter(|u| !u.is_empty())
        .or_else(|| user.filter(|u| !u.is_empty()))
        .or_else(|| {
            User::from_uid(Uid::current())
                .ok()
                .flatten()
                .map(|account| account.name)
        })
}

/// Whether kiln runs with root privileges.
#[must_use]
pub fn is_root() -> bool {
    Uid::effective().is_root()
}
