//! systemd unit generation: pure functions, no I/O, no async.

#![allow(clippy::format_push_string)]

use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::domain::config::ProvisionConfig;

/// Seconds systemd waits before restarting the process.
pub const RESTART_SEC: u32 = 2;
/// Open-file-descriptor limit for the service.
pub const LIMIT_NOFILE: u64 = 1_048_576;

/// Supervisor-level description of the long-running process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUnit {
    pub name: String,
    pub user: String,
    pub working_directory: PathBuf,
    pub environment_file: PathBuf,
    pub exec_start: String,
    pub restart_sec: u32,
    pub limit_nofile: u64,
}

impl ServiceUnit {
    /// Derive the unit from the run configuration.
    ///
    /// The start command runs the entrypoint with the interpreter of the
    /// installation's own virtual environment.
    #[must_use]
    pub fn from_config(config: &ProvisionConfig) -> Self {
        let python = config.venv_dir().join("bin").join("python");
        let script = config.install_dir.join(&config.entrypoint);
        Self {
            name: config.service_name.clone(),
            user: config.user.clone(),
            working_directory: config.install_dir.clone(),
            environment_file: config.env_file_path(),
            exec_start: format!(
                "{} {}",
                exec_arg(&python.to_string_lossy()),
                exec_arg(&script.to_string_lossy())
            ),
            restart_sec: RESTART_SEC,
            limit_nofile: LIMIT_NOFILE,
        }
    }

    /// `<name>.service`
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.service", self.name)
    }

    /// Render the unit file. Returns the content and does NOT write to disk.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("# Generated by kiln - DO NOT EDIT\n");
        out.push_str("[Unit]\n");
        out.push_str(&format!("Description={} service\n", self.name));
        out.push_str("Wants=network-online.target\n");
        out.push_str("After=network-online.target\n");
        out.push('\n');
        out.push_str("[Service]\n");
        out.push_str("Type=simple\n");
        out.push_str(&format!("User={}\n", specifiers(&self.user)));
        out.push_str(&format!(
            "WorkingDirectory={}\n",
            specifiers(&self.working_directory.to_string_lossy())
        ));
        out.push_str(&format!(
            "EnvironmentFile={}\n",
            specifiers(&self.environment_file.to_string_lossy())
        ));
        out.push_str(&format!("ExecStart={}\n", self.exec_start));
        out.push_str("Restart=always\n");
        out.push_str(&format!("RestartSec={}\n", self.restart_sec));
        out.push_str(&format!("LimitNOFILE={}\n", self.limit_nofile));
        out.push('\n');
        out.push_str("[Install]\n");
        out.push_str("WantedBy=multi-user.target\n");
        out
    }
}

/// Escape `%` so systemd does not expand it as a specifier.
fn specifiers(value: &str) -> String {
    value.replace('%', "%%")
}

/// One `ExecStart=` argument. Arguments containing whitespace, quotes,
/// backslashes or `;` are double-quoted; `%` and `$` are always escaped.
fn exec_arg(value: &str) -> String {
    let escaped = specifiers(value).replace('$', "$$");
    if !escaped
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | ';'))
    {
        return escaped;
    }
    let mut quoted = String::with_capacity(escaped.len() + 2);
    quoted.push('"');
    for c in escaped.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// SHA-256 of a unit file's content, hex-encoded.
#[must_use]
pub fn unit_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
