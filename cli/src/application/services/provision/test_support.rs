//! In-memory host used by the provision service tests.
//!
//! `FakeHost` implements every capability port itself and journals each
//! call as `"<op> <detail>"`. A single op can be made to fail with
//! [`FakeHost::failing`].

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Result, bail};

use crate::application::ports::{
    ClockSync, Divergence, HealthProbe, HostEnvironment, HostFs, PackageManager,
    ProgressReporter, RuntimeInstaller, ServiceSupervisor, SourceControl,
};
use crate::domain::config::ProvisionConfig;
use crate::domain::health::ProbeTarget;

pub fn test_config() -> ProvisionConfig {
    ProvisionConfig {
        repo_url: "https://example.com/mirror.git".to_string(),
        branch: "main".to_string(),
        api_id: "12345".to_string(),
        api_hash: "0123456789abcdef".to_string(),
        bearer: Some("tok".to_string()),
        host: "127.0.0.1".to_string(),
        port: 8080,
        service_name: "mirror".to_string(),
        user: "svc".to_string(),
        install_dir: PathBuf::from("/srv/mirror"),
        entrypoint: "app.py".to_string(),
        reset: false,
    }
}

// ── Filesystem ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryFs {
    dirs: Mutex<BTreeSet<PathBuf>>,
    files: Mutex<HashMap<PathBuf, String>>,
    owners: Mutex<HashMap<PathBuf, String>>,
    modes: Mutex<HashMap<PathBuf, u32>>,
}

impl MemoryFs {
    pub fn seed_dir(&self, path: &Path) {
        let mut dirs = self.dirs.lock().expect("lock");
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    pub fn seed_file(&self, path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            self.seed_dir(parent);
        }
        self.files
            .lock()
            .expect("lock")
            .insert(path.to_path_buf(), content.to_string());
    }

    pub fn file(&self, path: &Path) -> Option<String> {
        self.files.lock().expect("lock").get(path).cloned()
    }

    pub fn owner_of(&self, path: &Path) -> Option<String> {
        self.owners.lock().expect("lock").get(path).cloned()
    }

    pub fn mode_of(&self, path: &Path) -> Option<u32> {
        self.modes.lock().expect("lock").get(path).copied()
    }
}

impl HostFs for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.dirs.lock().expect("lock").contains(path)
            || self.files.lock().expect("lock").contains_key(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.seed_dir(path);
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        let removed = {
            let mut dirs = self.dirs.lock().expect("lock");
            let before = dirs.len();
            dirs.retain(|d| !d.starts_with(path));
            before != dirs.len()
        };
        if !removed {
            bail!("{} does not exist", path.display());
        }
        self.files
            .lock()
            .expect("lock")
            .retain(|f, _| !f.starts_with(path));
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        match self.files.lock().expect("lock").remove(path) {
            Some(_) => Ok(()),
            None => bail!("{} does not exist", path.display()),
        }
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.seed_file(path, content);
        Ok(())
    }

    fn write_private(&self, path: &Path, content: &str, mode: u32) -> Result<()> {
        self.seed_file(path, content);
        self.set_permissions(path, mode)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        match self.file(path) {
            Some(content) => Ok(content),
            None => bail!("{} does not exist", path.display()),
        }
    }

    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()> {
        self.modes
            .lock()
            .expect("lock")
            .insert(path.to_path_buf(), mode);
        Ok(())
    }

    fn set_owner(&self, path: &Path, user: &str, _recursive: bool) -> Result<()> {
        self.owners
            .lock()
            .expect("lock")
            .insert(path.to_path_buf(), user.to_string());
        Ok(())
    }
}

// ── Host ──────────────────────────────────────────────────────────────────────

pub struct FakeHost {
    fs: MemoryFs,
    journal: Mutex<Vec<String>>,
    failing: Option<&'static str>,
    divergence: Divergence,
    probe_status: Option<u16>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            fs: MemoryFs::default(),
            journal: Mutex::new(Vec::new()),
            failing: None,
            divergence: Divergence::default(),
            probe_status: Some(200),
        }
    }

    /// Make the op journaled as `op` return an error.
    pub fn failing(mut self, op: &'static str) -> Self {
        self.failing = Some(op);
        self
    }

    pub fn with_divergence(mut self, divergence: Divergence) -> Self {
        self.divergence = divergence;
        self
    }

    /// `None` simulates a refused connection.
    pub fn with_probe_status(mut self, status: Option<u16>) -> Self {
        self.probe_status = status;
        self
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().expect("lock").clone()
    }

    fn record(&self, op: &'static str, detail: &str) -> Result<()> {
        let entry = if detail.is_empty() {
            op.to_string()
        } else {
            format!("{op} {detail}")
        };
        self.journal.lock().expect("lock").push(entry);
        if self.failing == Some(op) {
            bail!("{op} failed (injected)");
        }
        Ok(())
    }
}

impl HostEnvironment for FakeHost {
    type Packages = Self;
    type Clock = Self;
    type Fs = MemoryFs;
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
    fn fs(&self) -> &MemoryFs {
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

impl PackageManager for FakeHost {
    async fn install(&self, packages: &[&str]) -> Result<()> {
        self.record("packages.install", &packages.join(" "))
    }
}

impl ClockSync for FakeHost {
    async fn sync(&self) -> Result<()> {
        self.record("clock.sync", "")
    }
}

impl SourceControl for FakeHost {
    async fn clone_branch(&self, repo: &str, branch: &str, dest: &Path) -> Result<()> {
        self.record(
            "source.clone",
            &format!("{repo} {branch} {}", dest.display()),
        )?;
        self.fs.seed_dir(&dest.join(".git"));
        Ok(())
    }

    async fn set_origin(&self, dir: &Path, repo: &str) -> Result<()> {
        self.record("source.origin", &format!("{} {repo}", dir.display()))
    }

    async fn fetch_all(&self, dir: &Path) -> Result<()> {
        self.record("source.fetch", &dir.display().to_string())
    }

    async fn divergence(&self, dir: &Path, branch: &str) -> Result<Divergence> {
        self.record("source.divergence", &format!("{} {branch}", dir.display()))?;
        Ok(self.divergence.clone())
    }

    async fn hard_reset(&self, dir: &Path, branch: &str) -> Result<()> {
        self.record("source.reset", &format!("{} {branch}", dir.display()))
    }

    async fn head_commit(&self, dir: &Path) -> Result<String> {
        self.record("source.head", &dir.display().to_string())?;
        Ok("0123abcd".to_string())
    }
}

impl RuntimeInstaller for FakeHost {
    async fn create_env(&self, env_dir: &Path) -> Result<()> {
        self.record("runtime.create", &env_dir.display().to_string())
    }

    async fn upgrade_installer(&self, env_dir: &Path) -> Result<()> {
        self.record("runtime.upgrade", &env_dir.display().to_string())
    }

    async fn install_manifest(&self, _env_dir: &Path, manifest: &Path) -> Result<()> {
        self.record("runtime.manifest", &manifest.display().to_string())
    }

    async fn install_packages(&self, _env_dir: &Path, packages: &[&str]) -> Result<()> {
        self.record("runtime.packages", &packages.join(" "))
    }
}

impl ServiceSupervisor for FakeHost {
    fn unit_path(&self, name: &str) -> PathBuf {
        PathBuf::from("/etc/systemd/system").join(format!("{name}.service"))
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
        Ok(true)
    }
}

impl HealthProbe for FakeHost {
    async fn probe(&self, target: &ProbeTarget) -> Result<u16> {
        let detail = if target.bearer.is_some() {
            format!("{} bearer", target.url)
        } else {
            target.url.clone()
        };
        self.record("probe", &detail)?;
        match self.probe_status {
            Some(code) => Ok(code),
            None => bail!("connection refused"),
        }
    }
}

// ── Reporter ──────────────────────────────────────────────────────────────────

/// Captures reporter output as `"step: …"`, `"ok: …"` and `"warn: …"`.
#[derive(Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("lock").clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.lines.lock().expect("lock").push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.lines.lock().expect("lock").push(format!("ok: {message}"));
    }
    fn warn(&self, message: &str) {
        self.lines.lock().expect("lock").push(format!("warn: {message}"));
    }
}
