//! Application service: dry-run plan use-case.
//!
//! Describes what `provision` would do on this host without doing any of it.
//! Only read-only queries (`exists`, `unit_path`) touch the host.

use crate::application::ports::{HostFs, ServiceSupervisor};
use crate::application::services::provision::dependencies::FALLBACK_PACKAGES;
use crate::application::services::provision::files::ENV_FILE_MODE;
use crate::application::services::provision::system::SYSTEM_PACKAGES;
use crate::application::services::provision::ProvisionOptions;
use crate::domain::config::{PENDING_SESSIONS_DIR, ProvisionConfig, SESSIONS_DIR, STATE_FILE};
use crate::domain::env_file::EnvironmentFile;
use crate::domain::error::ProvisionError;
use crate::domain::health::ProbeTarget;
use crate::domain::report::{PlannedStep, ProvisionPlan};
use crate::domain::step::Step;
use crate::domain::unit::ServiceUnit;

/// Build the plan for `config`.
///
/// # Errors
///
/// Returns [`ProvisionError::Config`] if the configuration would fail the
/// validation step.
pub fn plan(
    fs: &impl HostFs,
    supervisor: &impl ServiceSupervisor,
    config: &ProvisionConfig,
    opts: &ProvisionOptions,
) -> Result<ProvisionPlan, ProvisionError> {
    config.validate()?;

    let unit = ServiceUnit::from_config(config);
    let unit_path = supervisor.unit_path(&unit.name);
    let dir = config.install_dir.display();

    let steps = Step::ALL
        .iter()
        .map(|&step| {
            let detail = match step {
                Step::Validate => format!(
                    "repository {} branch {}, run as {}",
                    config.repo_url, config.branch, config.user
                ),
                Step::SyncClock => "enable network time sync (best effort)".to_string(),
                Step::InstallPackages => format!("install {}", SYSTEM_PACKAGES.join(" ")),
                Step::PrepareDirectory => format!("create {dir}, owned by {}", config.user),
                Step::SyncSource if fs.exists(&config.git_dir()) => format!(
                    "fetch and hard-reset {dir} to origin/{} (local changes are discarded)",
                    config.branch
                ),
                Step::SyncSource => format!(
                    "clone {} ({}) into {dir}",
                    config.repo_url, config.branch
                ),
                Step::InstallDependencies if fs.exists(&config.requirements_path()) => format!(
                    "create {} and install {}",
                    config.venv_dir().display(),
                    config.requirements_path().display()
                ),
                Step::InstallDependencies => format!(
                    "create {} and install {}",
                    config.venv_dir().display(),
                    FALLBACK_PACKAGES.join(" ")
                ),
                Step::WriteEnvironment => format!(
                    "write {} (mode {ENV_FILE_MODE:o}, replaces existing file)",
                    config.env_file_path().display()
                ),
                Step::PrepareRuntimeDirs if config.reset => format!(
                    "delete {STATE_FILE}, {SESSIONS_DIR}/ and {PENDING_SESSIONS_DIR}/, then recreate the directories"
                ),
                Step::PrepareRuntimeDirs => {
                    format!("create {SESSIONS_DIR}/ and {PENDING_SESSIONS_DIR}/ (existing state kept)")
                }
                Step::RegisterService => format!(
                    "write {}, reload the supervisor, enable {}",
                    unit_path.display(),
                    unit.name
                ),
                Step::StartService => format!("restart {}", config.service_name),
                Step::HealthCheck => {
                    let target =
                        ProbeTarget::new(&config.host, config.port, config.bearer.as_deref());
                    let severity = if opts.require_healthy { "fatal" } else { "warning only" };
                    format!(
                        "GET {} after {}s ({severity})",
                        target.url,
                        opts.health_delay.as_secs()
                    )
                }
            };
            PlannedStep {
                step,
                number: step.number(),
                detail,
            }
        })
        .collect();

    Ok(ProvisionPlan {
        service: config.service_name.clone(),
        install_dir: config.install_dir.clone(),
        steps,
        env_file: EnvironmentFile::new(config, &opts.tuning).render_masked(),
        unit_path,
        unit: unit.render(),
    })
}
