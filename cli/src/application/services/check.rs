//! Application service: check an installed service.
//!
//! Reads the bind address back from the installed environment file, asks the
//! supervisor whether the unit is active, and probes the status endpoint.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{HealthProbe, HostFs, ServiceSupervisor};
use crate::application::services::provision::health::probe_once;
use crate::domain::config::{DEFAULT_HOST, DEFAULT_PORT, ENV_FILE, validate_unit_name};
use crate::domain::env_file;
use crate::domain::health::{HealthStatus, ProbeTarget};
use crate::domain::report::CheckReport;

/// Probe target described by an installed environment file.
///
/// # Errors
///
/// Returns an error if `BIND_PORT` is present but not a valid port.
pub fn target_from_env_file(content: &str) -> Result<ProbeTarget> {
    let entries = env_file::parse(content);
    let lookup = |key: &str| {
        entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };
    let host = lookup("BIND_HOST").unwrap_or(DEFAULT_HOST);
    let port = match lookup("BIND_PORT") {
        Some(raw) => raw
            .parse::<u16>()
            .with_context(|| format!("BIND_PORT '{raw}' is not a port"))?,
        None => DEFAULT_PORT,
    };
    Ok(ProbeTarget::new(host, port, lookup("API_BEARER")))
}

/// Report whether `service`, installed at `install_dir`, is up.
///
/// An inactive unit is not probed.
///
/// # Errors
///
/// Returns an error if the service name is invalid, the environment file
/// cannot be read, or the supervisor cannot be queried.
pub async fn check_service(
    fs: &impl HostFs,
    supervisor: &impl ServiceSupervisor,
    probe: &impl HealthProbe,
    service: &str,
    install_dir: &Path,
) -> Result<CheckReport> {
    validate_unit_name(service)?;
    let env_path = install_dir.join(ENV_FILE);
    let content = fs
        .read_to_string(&env_path)
        .with_context(|| format!("{service} does not look provisioned at {}", install_dir.display()))?;
    let target = target_from_env_file(&content)?;

    let active = supervisor
        .is_active(service)
        .await
        .with_context(|| format!("querying state of {service}"))?;
    let health = if active {
        probe_once(probe, &target).await
    } else {
        HealthStatus::Skipped
    };

    Ok(CheckReport {
        service: service.to_string(),
        install_dir: install_dir.to_path_buf(),
        active,
        url: target.url,
        health,
    })
}
