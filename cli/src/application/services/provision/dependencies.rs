//! Runtime dependency step.

use crate::application::ports::{HostFs, RuntimeInstaller};
use crate::application::services::provision::OrStep;
use crate::domain::config::ProvisionConfig;
use crate::domain::error::ProvisionError;
use crate::domain::report::DependencySource;

/// Installed when the checkout ships no `requirements.txt`.
pub const FALLBACK_PACKAGES: &[&str] = &[
    "fastapi",
    "uvicorn[standard]",
    "telethon",
    "aiohttp",
    "pydantic-settings",
    "python-multipart",
];

/// Create the service's virtual environment and install its dependencies.
///
/// A manifest in the checkout wins; otherwise the unpinned
/// [`FALLBACK_PACKAGES`] are installed.
///
/// # Errors
///
/// Returns [`ProvisionError::Dependency`] if any installer invocation fails.
pub async fn install_dependencies(
    runtime: &impl RuntimeInstaller,
    fs: &impl HostFs,
    config: &ProvisionConfig,
) -> Result<DependencySource, ProvisionError> {
    let env_dir = config.venv_dir();
    runtime
        .create_env(&env_dir)
        .await
        .or_step(ProvisionError::Dependency)?;
    runtime
        .upgrade_installer(&env_dir)
        .await
        .or_step(ProvisionError::Dependency)?;

    let manifest = config.requirements_path();
    if fs.exists(&manifest) {
        runtime
            .install_manifest(&env_dir, &manifest)
            .await
            .or_step(ProvisionError::Dependency)?;
        return Ok(DependencySource::Manifest { path: manifest });
    }

    tracing::info!("no dependency manifest in checkout, installing fallback set");
    runtime
        .install_packages(&env_dir, FALLBACK_PACKAGES)
        .await
        .or_step(ProvisionError::Dependency)?;
    Ok(DependencySource::Fallback {
        packages: FALLBACK_PACKAGES.iter().map(|p| (*p).to_string()).collect(),
    })
}
