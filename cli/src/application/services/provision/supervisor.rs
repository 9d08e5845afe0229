//! Service registration and start steps.

use std::path::PathBuf;

use crate::application::ports::{HostFs, ServiceSupervisor};
use crate::application::services::provision::OrStep;
use crate::domain::config::ProvisionConfig;
use crate::domain::error::ProvisionError;
use crate::domain::unit::{ServiceUnit, unit_hash};

/// Unit files are world-readable, root-writable.
pub const UNIT_FILE_MODE: u32 = 0o644;

/// Outcome of writing the unit definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub unit_path: PathBuf,
    /// False when the rendered definition matched the file on disk.
    pub changed: bool,
}

/// Write the unit definition, reload the supervisor, and enable the unit.
///
/// The file is rewritten on every run; `changed` records whether its
/// content actually differed.
///
/// # Errors
///
/// Returns [`ProvisionError::Supervisor`] if the file cannot be written or
/// the supervisor rejects the reload or enable.
pub async fn register_service(
    supervisor: &impl ServiceSupervisor,
    fs: &impl HostFs,
    config: &ProvisionConfig,
) -> Result<Registration, ProvisionError> {
    let unit = ServiceUnit::from_config(config);
    let unit_path = supervisor.unit_path(&unit.name);
    let content = unit.render();

    let previous = if fs.exists(&unit_path) {
        fs.read_to_string(&unit_path).ok()
    } else {
        None
    };
    let changed = previous.is_none_or(|old| unit_hash(&old) != unit_hash(&content));
    tracing::debug!(path = %unit_path.display(), changed, "writing unit file");

    fs.write(&unit_path, &content)
        .or_step(ProvisionError::Supervisor)?;
    fs.set_permissions(&unit_path, UNIT_FILE_MODE)
        .or_step(ProvisionError::Supervisor)?;
    supervisor
        .reload()
        .await
        .or_step(ProvisionError::Supervisor)?;
    supervisor
        .enable(&unit.name)
        .await
        .or_step(ProvisionError::Supervisor)?;

    Ok(Registration { unit_path, changed })
}

/// Start the service, restarting it if it is already running.
///
/// # Errors
///
/// Returns [`ProvisionError::Supervisor`] if the supervisor refuses.
pub async fn start_service(
    supervisor: &impl ServiceSupervisor,
    config: &ProvisionConfig,
) -> Result<(), ProvisionError> {
    supervisor
        .restart(&config.service_name)
        .await
        .or_step(ProvisionError::Supervisor)
}
