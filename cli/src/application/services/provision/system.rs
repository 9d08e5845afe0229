//! Host preparation steps: clock sync and OS packages.

use crate::application::ports::{ClockSync, PackageManager};
use crate::application::services::provision::OrStep;
use crate::domain::error::ProvisionError;

/// System packages the service and the later steps depend on.
pub const SYSTEM_PACKAGES: &[&str] = &[
    "git",
    "python3",
    "python3-venv",
    "python3-pip",
    "curl",
    "ca-certificates",
];

/// Best-effort clock synchronization.
///
/// The service's upstream protocol client rejects skewed clocks, so kiln
/// asks for network time, but a failure only becomes a warning.
///
/// # Errors
///
/// Returns the warning text when synchronization fails.
pub async fn sync_clock(clock: &impl ClockSync) -> Result<(), String> {
    clock
        .sync()
        .await
        .map_err(|e| format!("clock sync failed (continuing): {e:#}"))
}

/// Install [`SYSTEM_PACKAGES`].
///
/// # Errors
///
/// Returns [`ProvisionError::Package`] if the package manager fails.
pub async fn install_packages(pm: &impl PackageManager) -> Result<(), ProvisionError> {
    pm.install(SYSTEM_PACKAGES)
        .await
        .or_step(ProvisionError::Package)
}
