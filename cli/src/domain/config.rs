//! Provisioning configuration: layered settings and the validated record.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::error::ProvisionError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SERVICE: &str = "tg-mirror";
pub const DEFAULT_ENTRYPOINT: &str = "app.py";
pub const DEFAULT_INSTALL_ROOT: &str = "/opt";

/// Working subdirectory for active session artifacts.
pub const SESSIONS_DIR: &str = "sessions";
/// Working subdirectory for session artifacts awaiting login.
pub const PENDING_SESSIONS_DIR: &str = "sessions_pending";
/// Run-state file maintained by the provisioned service.
pub const STATE_FILE: &str = "state.json";
pub const ENV_FILE: &str = ".env";
pub const VENV_DIR: &str = ".venv";
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

// ── Settings layer ───────────────────────────────────────────────────────────

/// A numeric identifier that may be written as a number or a string in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Number(u64),
    Text(String),
}

impl IdValue {
    fn into_string(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

/// One layer of partially-specified settings.
///
/// Command-line flags, environment variables and the optional config file
/// each produce a layer; [`ProvisionSettings::or`] stacks them, and
/// [`ProvisionSettings::into_config`] fills the gaps with built-in defaults.
/// The reset flag is not part of any layer; only the command line sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisionSettings {
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub api_id: Option<IdValue>,
    pub api_hash: Option<String>,
    pub bearer: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub service: Option<String>,
    pub user: Option<String>,
    pub dir: Option<PathBuf>,
    pub entrypoint: Option<String>,
}

impl ProvisionSettings {
    /// Fill every unset field of `self` from `lower`.
    #[must_use]
    pub fn or(self, lower: ProvisionSettings) -> ProvisionSettings {
        ProvisionSettings {
            repo: self.repo.or(lower.repo),
            branch: self.branch.or(lower.branch),
            api_id: self.api_id.or(lower.api_id),
            api_hash: self.api_hash.or(lower.api_hash),
            bearer: self.bearer.or(lower.bearer),
            host: self.host.or(lower.host),
            port: self.port.or(lower.port),
            service: self.service.or(lower.service),
            user: self.user.or(lower.user),
            dir: self.dir.or(lower.dir),
            entrypoint: self.entrypoint.or(lower.entrypoint),
        }
    }

    /// Resolve into a [`ProvisionConfig`], applying defaults.
    ///
    /// Required values that are still missing become empty strings so that
    /// [`ProvisionConfig::validate`] reports them together. `fallback_user`
    /// is used when no layer names a user (normally the invoking user).
    #[must_use]
    pub fn into_config(self, reset: bool, fallback_user: Option<String>) -> ProvisionConfig {
        let service_name = self.service.unwrap_or_else(|| DEFAULT_SERVICE.to_string());
        let install_dir = self
            .dir
            .unwrap_or_else(|| Path::new(DEFAULT_INSTALL_ROOT).join(&service_name));
        ProvisionConfig {
            repo_url: self.repo.unwrap_or_default(),
            branch: self.branch.unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            api_id: self.api_id.map(IdValue::into_string).unwrap_or_default(),
            api_hash: self.api_hash.unwrap_or_default(),
            bearer: self.bearer.filter(|b| !b.is_empty()),
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            service_name,
            user: self.user.or(fallback_user).unwrap_or_default(),
            install_dir,
            entrypoint: self
                .entrypoint
                .unwrap_or_else(|| DEFAULT_ENTRYPOINT.to_string()),
            reset,
        }
    }
}

// ── Validated record ─────────────────────────────────────────────────────────

/// Immutable input of a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionConfig {
    pub repo_url: String,
    pub branch: String,
    /// Numeric API identifier, kept as text until validated.
    pub api_id: String,
    pub api_hash: String,
    pub bearer: Option<String>,
    pub host: String,
    pub port: u16,
    pub service_name: String,
    /// OS user that owns the installation and runs the service.
    pub user: String,
    pub install_dir: PathBuf,
    /// Script started by the unit, relative to `install_dir`.
    pub entrypoint: String,
    /// Delete persisted run-state before recreating runtime directories.
    pub reset: bool,
}

impl ProvisionConfig {
    /// Check the record before any side effect happens.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Config`] naming every missing required value,
    /// or the first malformed one.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        let missing: Vec<&str> = [
            ("repo", &self.repo_url),
            ("api-id", &self.api_id),
            ("api-hash", &self.api_hash),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(invalid(format!(
                "missing required value(s): {}",
                missing.join(", ")
            )));
        }

        if !self.api_id.trim().parse::<u64>().is_ok_and(|id| id > 0) {
            return Err(invalid(format!(
                "api-id must be a positive integer, got '{}'",
                self.api_id
            )));
        }
        if self.branch.trim().is_empty() {
            return Err(invalid("branch must not be empty".to_string()));
        }
        if self.host.trim().is_empty() {
            return Err(invalid("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(invalid("port must be between 1 and 65535".to_string()));
        }
        validate_unit_name(&self.service_name)?;
        if self.user.trim().is_empty() {
            return Err(invalid(
                "user could not be determined; pass --user".to_string(),
            ));
        }
        if !self.install_dir.is_absolute() {
            return Err(invalid(format!(
                "install dir must be an absolute path, got '{}'",
                self.install_dir.display()
            )));
        }
        if self.entrypoint.trim().is_empty() {
            return Err(invalid("entrypoint must not be empty".to_string()));
        }
        if Path::new(&self.entrypoint).is_absolute() {
            return Err(invalid(format!(
                "entrypoint must be relative to the install dir, got '{}'",
                self.entrypoint
            )));
        }

        // Everything below lands verbatim in a unit directive, a KEY=value
        // line or a git argument.
        let install_dir = self.install_dir.to_string_lossy();
        let rendered = [
            ("repo", self.repo_url.as_str()),
            ("branch", self.branch.as_str()),
            ("api-hash", self.api_hash.as_str()),
            ("bearer", self.bearer.as_deref().unwrap_or_default()),
            ("host", self.host.as_str()),
            ("user", self.user.as_str()),
            ("install dir", &*install_dir),
            ("entrypoint", self.entrypoint.as_str()),
        ];
        if let Some((name, _)) = rendered
            .iter()
            .find(|(_, v)| v.chars().any(char::is_control))
        {
            return Err(invalid(format!(
                "{name} must not contain line breaks or control characters"
            )));
        }
        if self.user.chars().any(char::is_whitespace) {
            return Err(invalid(format!(
                "user must not contain whitespace, got '{}'",
                self.user
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn env_file_path(&self) -> PathBuf {
        self.install_dir.join(ENV_FILE)
    }

    #[must_use]
    pub fn git_dir(&self) -> PathBuf {
        self.install_dir.join(".git")
    }

    #[must_use]
    pub fn venv_dir(&self) -> PathBuf {
        self.install_dir.join(VENV_DIR)
    }

    #[must_use]
    pub fn requirements_path(&self) -> PathBuf {
        self.install_dir.join(REQUIREMENTS_FILE)
    }

    #[must_use]
    pub fn sessions_dir(&self) -> PathBuf {
        self.install_dir.join(SESSIONS_DIR)
    }

    #[must_use]
    pub fn pending_sessions_dir(&self) -> PathBuf {
        self.install_dir.join(PENDING_SESSIONS_DIR)
    }

    #[must_use]
    pub fn state_file_path(&self) -> PathBuf {
        self.install_dir.join(STATE_FILE)
    }
}

/// Validate a systemd unit name (without the `.service` suffix).
///
/// # Errors
///
/// Returns [`ProvisionError::Config`] if the name is empty or contains
/// characters outside `[A-Za-z0-9_.@-]`.
pub fn validate_unit_name(name: &str) -> Result<(), ProvisionError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '@' | '-'));
    if valid {
        Ok(())
    } else {
        Err(invalid(format!(
            "invalid service name '{name}': must match [A-Za-z0-9_.@-]+"
        )))
    }
}

fn invalid(msg: String) -> ProvisionError {
    ProvisionError::Config(msg)
}

// ── Unit tests ───────────────────────────────────────────────────────────────
