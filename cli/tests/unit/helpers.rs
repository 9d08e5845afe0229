//! Shared test helpers: a host that uses the real filesystem under a
//! temporary directory and scripted fakes for every external program.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Result, bail};
use kiln_cli::application::ports::{
    ClockSync, Divergence, HealthProbe, HostEnvironment, PackageManager, ProgressReporter,
    RuntimeInstaller, ServiceSupervisor, SourceControl,
};
use kiln_cli::domain::config::ProvisionConfig;
use kiln_cli::domain::health::ProbeTarget;
use kiln_cli::infra::fs::LocalFs;
use nix::unistd::{Uid, User};
use tempfile::TempDir;

pub const HEAD: &str = "c0ffee00c0ffee00c0ffee00c0ffee00c0ffee00";

/// Name of the account running the tests; `chown` to it needs no privileges.
pub fn current_user() -> String {
    User::from_uid(Uid::current())
        .expect("user lookup")
        .expect("current uid has an account")
        .name
}

/// A valid configuration installing into `root/app`.
pub fn config_in(root: &Path) -> ProvisionConfig {
    ProvisionConfig {
        repo_url: "https://example.com/mirror.git".to_string(),
        branch: "main".to_string(),
        api_id: "12345".to_string(),
        api_hash: "0123456789abcdef".to_string(),
        bearer: Some("s3cret".to_string()),
        host: "127.0.0.1".to_string(),
        port: 8080,
        service_name: "mirror".to_string(),
        user: current_user(),
        install_dir: root.join("app"),
        entrypoint: "app.py".to_string(),
        reset: false,
    }
}

// ── Host fake ────────────────────────────────────────────────────────────────

/// Host whose filesystem is real and whose programs are scripted.
///
/// Every program invocation is journaled as `"<op> <detail>"`.
pub struct TempHost {
    pub root: TempDir,
    fs: LocalFs,
    journal: Mutex<Vec<String>>,
    fail_on: Option<&'static str>,
    clone_manifest: bool,
    divergence: Divergence,
    probe_status: Option<u16>,
}

impl TempHost {
    pub fn new() -> Self {
        let root = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(root.path().join("units")).expect("unit dir");
        Self {
            root,
            fs: LocalFs,
            journal: Mutex::new(Vec::new()),
            fail_on: None,
            clone_manifest: false,
            divergence: Divergence::default(),
            probe_status: Some(200),
        }
    }

    /// Make the program journaled as `op` fail.
    pub fn failing(mut self, op: &'static str) -> Self {
        self.fail_on = Some(op);
        self
    }

    /// Cloned trees contain a `requirements.txt`.
    pub fn with_manifest(mut self) -> Self {
        self.clone_manifest = true;
        self
    }

    pub fn with_divergence(mut self, divergence: Divergence) -> Self {
        self.divergence = divergence;
        self
    }

    /// `None` means the probe gets no response at all.
    pub fn with_probe_status(mut self, status: Option<u16>) -> Self {
        self.probe_status = status;
        self
    }

    pub fn config(&self) -> ProvisionConfig {
        config_in(self.root.path())
    }

    pub fn unit_dir(&self) -> PathBuf {
        self.root.path().join("units")
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().expect("journal lock").clone()
    }

    /// Operation names only, without details.
    pub fn ops(&self) -> Vec<String> {
        self.journal()
            .iter()
            .map(|entry| entry.split(' ').next().unwrap_or_default().to_string())
            .collect()
    }

    fn record(&self, op: &'static str, detail: impl Into<String>) -> Result<()> {
        let detail = detail.into();
        self.journal
            .lock()
            .expect("journal lock")
            .push(format!("{op} {detail}").trim_end().to_string());
        if self.fail_on == Some(op) {
            bail!("{op} exited with status 1");
        }
        Ok(())
    }
}

impl HostEnvironment for TempHost {
    type Packages = Self;
    type Clock = Self;
    type Fs = LocalFs;
    type Source = Self;
    type Runtime = Self;
    type Supervisor = Self;
    type Probe = Self;

    fn packages(&self) -> &Self {
        self
    }
    fn clock(&self) -> &Self {
        self
    }
    fn fs(&self) -> &LocalFs {
        &self.fs
    }
    fn source(&self) -> &Self {
        self
    }
    fn runtime(&self) -> &Self {
        self
    }
    fn supervisor(&self) -> &Self {
        self
    }
    fn probe(&self) -> &Self {
        self
    }
}

impl PackageManager for TempHost {
    async fn install(&self, packages: &[&str]) -> Result<()> {
        self.record("packages.install", packages.join(" "))
    }
}

impl ClockSync for TempHost {
    async fn sync(&self) -> Result<()> {
        self.record("clock.sync", "")
    }
}

impl SourceControl for TempHost {
    async fn clone_branch(&self, repo: &str, branch: &str, dest: &Path) -> Result<()> {
        self.record("source.clone", format!("{repo} {branch}"))?;
        std::fs::create_dir_all(dest.join(".git"))?;
        std::fs::write(dest.join("app.py"), "print('hello')\n")?;
        if self.clone_manifest {
            std::fs::write(dest.join("requirements.txt"), "fastapi==0.110.0\n")?;
        }
        Ok(())
    }

    async fn set_origin(&self, _dir: &Path, repo: &str) -> Result<()> {
        self.record("source.origin", repo)
    }

    async fn fetch_all(&self, _dir: &Path) -> Result<()> {
        self.record("source.fetch", "")
    }

    async fn divergence(&self, _dir: &Path, branch: &str) -> Result<Divergence> {
        self.record("source.divergence", branch)?;
        Ok(self.divergence.clone())
    }

    async fn hard_reset(&self, dir: &Path, branch: &str) -> Result<()> {
        self.record("source.reset", branch)?;
        // A reset restores tracked files to the branch tip.
        std::fs::write(dir.join("app.py"), "print('hello')\n")?;
        Ok(())
    }

    async fn head_commit(&self, _dir: &Path) -> Result<String> {
        self.record("source.head", "")?;
        Ok(HEAD.to_string())
    }
}

impl RuntimeInstaller for TempHost {
    async fn create_env(&self, env_dir: &Path) -> Result<()> {
        self.record("runtime.create", env_dir.display().to_string())?;
        std::fs::create_dir_all(env_dir.join("bin"))?;
        Ok(())
    }

    async fn upgrade_installer(&self, _env_dir: &Path) -> Result<()> {
        self.record("runtime.upgrade", "")
    }

    async fn install_manifest(&self, _env_dir: &Path, manifest: &Path) -> Result<()> {
        self.record("runtime.manifest", manifest.display().to_string())
    }

    async fn install_packages(&self, _env_dir: &Path, packages: &[&str]) -> Result<()> {
        self.record("runtime.packages", packages.join(" "))
    }
}

impl ServiceSupervisor for TempHost {
    fn unit_path(&self, name: &str) -> PathBuf {
        self.unit_dir().join(format!("{name}.service"))
    }

    async fn reload(&self) -> Result<()> {
        self.record("supervisor.reload", "")
    }

    async fn enable(&self, name: &str) -> Result<()> {
        self.record("supervisor.enable", name)
    }

    async fn restart(&self, name: &str) -> Result<()> {
        self.record("supervisor.restart", name)
    }

    async fn is_active(&self, name: &str) -> Result<bool> {
        self.record("supervisor.is-active", name)?;
        Ok(self.fail_on != Some("supervisor.restart"))
    }
}

impl HealthProbe for TempHost {
    async fn probe(&self, target: &ProbeTarget) -> Result<u16> {
        let auth = if target.bearer.is_some() { " bearer" } else { "" };
        self.record("probe", format!("{}{auth}", target.url))?;
        match self.probe_status {
            Some(code) => Ok(code),
            None => bail!("connection refused"),
        }
    }
}

// ── Reporter ─────────────────────────────────────────────────────────────────

/// Reporter that keeps every line it is given.
#[derive(Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("reporter lock").clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|l| l.strip_prefix("warn: ").map(str::to_string))
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.lines
            .lock()
            .expect("reporter lock")
            .push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.lines
            .lock()
            .expect("reporter lock")
            .push(format!("ok: {message}"));
    }
    fn warn(&self, message: &str) {
        self.lines
            .lock()
            .expect("reporter lock")
            .push(format!("warn: {message}"));
    }
}
