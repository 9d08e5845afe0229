//! Port trait definitions for the Application layer.
//!
//! Ports are the capabilities the host must provide. This file imports only
//! from `crate::domain`, never from `crate::infra`, `crate::commands`, or
//! `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;

use crate::domain::config::ProvisionSettings;
use crate::domain::health::ProbeTarget;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Local state of a checkout that a hard reset would destroy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Divergence {
    /// One-line summaries of commits not on the remote branch.
    pub local_commits: Vec<String>,
    /// Tracked files with uncommitted modifications.
    pub modified_files: Vec<String>,
}

impl Divergence {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.local_commits.is_empty() && self.modified_files.is_empty()
    }
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
}

// ── Host Capability Ports ─────────────────────────────────────────────────────

/// OS package installation.
#[allow(async_fn_in_trait)]
pub trait PackageManager {
    /// Refresh package indexes and install `packages`.
    async fn install(&self, packages: &[&str]) -> Result<()>;
}

/// System clock synchronization.
#[allow(async_fn_in_trait)]
pub trait ClockSync {
    async fn sync(&self) -> Result<()>;
}

/// Local filesystem operations. Sync trait: callers never hold locks.
pub trait HostFs {
    fn exists(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    /// Write `content`, truncating any existing file.
    fn write(&self, path: &Path, content: &str) -> Result<()>;
    /// Replace `path` with `content` in one step. The new file carries
    /// `mode` from the moment it exists.
    fn write_private(&self, path: &Path, content: &str, mode: u32) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()>;
    /// Hand ownership of `path` (and, if `recursive`, everything below it)
    /// to `user` and that user's primary group.
    fn set_owner(&self, path: &Path, user: &str, recursive: bool) -> Result<()>;
}

/// Working-tree synchronization against a remote repository.
#[allow(async_fn_in_trait)]
pub trait SourceControl {
    /// Clone `branch` of `repo` into `dest`.
    async fn clone_branch(&self, repo: &str, branch: &str, dest: &Path) -> Result<()>;
    /// Point `origin` of an existing checkout at `repo`.
    async fn set_origin(&self, dir: &Path, repo: &str) -> Result<()>;
    /// Fetch every remote, pruning deleted branches.
    async fn fetch_all(&self, dir: &Path) -> Result<()>;
    /// Describe what a hard reset to `origin/<branch>` would discard.
    async fn divergence(&self, dir: &Path, branch: &str) -> Result<Divergence>;
    /// Move the checkout to `origin/<branch>`, discarding local changes.
    async fn hard_reset(&self, dir: &Path, branch: &str) -> Result<()>;
    /// Full hash of the checked-out commit.
    async fn head_commit(&self, dir: &Path) -> Result<String>;
}

/// Isolated runtime environment and package installer for the service.
#[allow(async_fn_in_trait)]
pub trait RuntimeInstaller {
    /// Create the environment at `env_dir` (no-op semantics if it exists).
    async fn create_env(&self, env_dir: &Path) -> Result<()>;
    /// Upgrade the environment's own package installer.
    async fn upgrade_installer(&self, env_dir: &Path) -> Result<()>;
    /// Install a locked dependency manifest.
    async fn install_manifest(&self, env_dir: &Path, manifest: &Path) -> Result<()>;
    /// Install named packages at unconstrained versions.
    async fn install_packages(&self, env_dir: &Path, packages: &[&str]) -> Result<()>;
}

/// Process supervisor (systemd in production).
#[allow(async_fn_in_trait)]
pub trait ServiceSupervisor {
    /// Where the unit file for `name` lives.
    fn unit_path(&self, name: &str) -> PathBuf;
    /// Reload unit definitions.
    async fn reload(&self) -> Result<()>;
    /// Enable the unit for boot-time start.
    async fn enable(&self, name: &str) -> Result<()>;
    /// Start the unit, or restart it if already running.
    async fn restart(&self, name: &str) -> Result<()>;
    /// Whether the unit is currently active.
    async fn is_active(&self, name: &str) -> Result<bool>;
}

/// HTTP probe of the service's status endpoint.
#[allow(async_fn_in_trait)]
pub trait HealthProbe {
    /// Send one request and return the HTTP status code.
    ///
    /// # Errors
    ///
    /// Returns an error only when no HTTP response was received.
    async fn probe(&self, target: &ProbeTarget) -> Result<u16>;
}

/// Bundle of every capability the provisioner needs from a host.
///
/// Each step receives only the capability it uses; the bundle exists so the
/// orchestrator can be handed one value (real or fake).
pub trait HostEnvironment {
    type Packages: PackageManager;
    type Clock: ClockSync;
    type Fs: HostFs;
    type Source: SourceControl;
    type Runtime: RuntimeInstaller;
    type Supervisor: ServiceSupervisor;
    type Probe: HealthProbe;

    fn packages(&self) -> &Self::Packages;
    fn clock(&self) -> &Self::Clock;
    fn fs(&self) -> &Self::Fs;
    fn source(&self) -> &Self::Source;
    fn runtime(&self) -> &Self::Runtime;
    fn supervisor(&self) -> &Self::Supervisor;
    fn probe(&self) -> &Self::Probe;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Configuration Port ────────────────────────────────────────────────────────

/// Source of the file-based settings layer.
pub trait ConfigStore {
    /// Load settings; a missing optional file yields empty settings.
    fn load(&self) -> Result<ProvisionSettings>;
    /// The file the settings are read from, if any.
    fn path(&self) -> Option<PathBuf>;
}
