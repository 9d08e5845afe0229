//! Application service: provision use-case.
//!
//! Runs the eleven steps in fixed order. Imports only from `crate::domain`
//! and `crate::application::ports`; all host effects go through the
//! capabilities of a [`HostEnvironment`].

pub mod dependencies;
pub mod files;
pub mod health;
pub mod source;
pub mod supervisor;
pub mod system;

#[cfg(test)]
pub(crate) mod test_support;

use std::time::Duration;

use chrono::Utc;

use crate::application::ports::{HostEnvironment, ProgressReporter};
use crate::domain::config::ProvisionConfig;
use crate::domain::env_file::TuningConstants;
use crate::domain::error::{ProvisionError, StepFailure};
use crate::domain::health::HealthStatus;
use crate::domain::report::{ProvisionReport, StepWarning};
use crate::domain::step::{STEP_COUNT, Step};

/// Pause between starting the service and probing it.
pub const DEFAULT_HEALTH_DELAY: Duration = Duration::from_secs(3);

/// Knobs that shape a run without being part of the target's identity.
#[derive(Debug, Clone)]
pub struct ProvisionOptions {
    pub tuning: TuningConstants,
    pub health_delay: Duration,
    /// Turn an unhealthy probe into a failed run.
    pub require_healthy: bool,
}

impl Default for ProvisionOptions {
    fn default() -> Self {
        Self {
            tuning: TuningConstants::default(),
            health_delay: DEFAULT_HEALTH_DELAY,
            require_healthy: false,
        }
    }
}

/// Fold a port error into the failing step's error class.
pub(crate) trait OrStep<T> {
    fn or_step(self, kind: fn(String) -> ProvisionError) -> Result<T, ProvisionError>;
}

impl<T> OrStep<T> for anyhow::Result<T> {
    fn or_step(self, kind: fn(String) -> ProvisionError) -> Result<T, ProvisionError> {
        self.map_err(|e| kind(format!("{e:#}")))
    }
}

/// Step bookkeeping shared by the reporter and the final report.
struct Progress<'a, R: ProgressReporter> {
    reporter: &'a R,
    completed: Vec<Step>,
    warnings: Vec<StepWarning>,
}

impl<'a, R: ProgressReporter> Progress<'a, R> {
    fn new(reporter: &'a R) -> Self {
        Self {
            reporter,
            completed: Vec::with_capacity(STEP_COUNT),
            warnings: Vec::new(),
        }
    }

    fn begin(&self, step: Step) {
        tracing::info!(step = %step, number = step.number(), "step started");
        self.reporter.step(&format!(
            "[{}/{STEP_COUNT}] {}...",
            step.number(),
            step.description()
        ));
    }

    fn finish(&mut self, step: Step, message: &str) {
        tracing::debug!(step = %step, "step finished");
        self.completed.push(step);
        self.reporter.success(message);
    }

    fn warn(&mut self, step: Step, message: String) {
        tracing::warn!(step = %step, %message, "step degraded");
        self.reporter.warn(&message);
        self.warnings.push(StepWarning { step, message });
    }

    /// Record the health check as completed, warned or failed.
    fn settle_health(
        &mut self,
        health: &HealthStatus,
        require_healthy: bool,
    ) -> Result<(), StepFailure> {
        let reason = match health {
            HealthStatus::Healthy { code } => {
                self.finish(Step::HealthCheck, &format!("Status endpoint answered {code}"));
                return Ok(());
            }
            HealthStatus::Unhealthy { reason } => reason.clone(),
            HealthStatus::Skipped => "status endpoint was not probed".to_string(),
        };
        if require_healthy {
            return Err(self.fail(Step::HealthCheck, ProvisionError::Health(reason)));
        }
        self.warn(
            Step::HealthCheck,
            format!("health check failed, service may still be starting: {reason}"),
        );
        Ok(())
    }

    fn fail(&self, step: Step, error: ProvisionError) -> StepFailure {
        tracing::error!(step = %step, code = error.code(), %error, "step failed");
        StepFailure::new(step, error)
    }
}

/// Provision the service described by `config` onto `host`.
///
/// Steps run strictly in order and every fatal failure aborts the run
/// without compensating earlier effects. Re-running with the same
/// configuration converges on the same host state.
///
/// # Errors
///
/// Returns [`StepFailure`] naming the first fatal step that failed.
#[tracing::instrument(skip_all, fields(service = %config.service_name))]
pub async fn provision<H: HostEnvironment>(
    host: &H,
    config: &ProvisionConfig,
    opts: &ProvisionOptions,
    reporter: &impl ProgressReporter,
) -> Result<ProvisionReport, StepFailure> {
    let mut run = Progress::new(reporter);

    run.begin(Step::Validate);
    config
        .validate()
        .map_err(|e| run.fail(Step::Validate, e))?;
    run.finish(Step::Validate, "Configuration valid");

    run.begin(Step::SyncClock);
    match system::sync_clock(host.clock()).await {
        Ok(()) => run.finish(Step::SyncClock, "Clock synchronized"),
        Err(message) => run.warn(Step::SyncClock, message),
    }

    run.begin(Step::InstallPackages);
    system::install_packages(host.packages())
        .await
        .map_err(|e| run.fail(Step::InstallPackages, e))?;
    run.finish(Step::InstallPackages, "System packages installed");

    run.begin(Step::PrepareDirectory);
    files::prepare_directory(host.fs(), config)
        .map_err(|e| run.fail(Step::PrepareDirectory, e))?;
    run.finish(
        Step::PrepareDirectory,
        &format!(
            "{} ready (owner {})",
            config.install_dir.display(),
            config.user
        ),
    );

    run.begin(Step::SyncSource);
    let source = source::sync_source(host.source(), host.fs(), config, reporter)
        .await
        .map_err(|e| run.fail(Step::SyncSource, e))?;
    run.finish(
        Step::SyncSource,
        &format!("Checked out {} at {}", config.branch, short(&source.commit)),
    );

    run.begin(Step::InstallDependencies);
    let deps = dependencies::install_dependencies(host.runtime(), host.fs(), config)
        .await
        .map_err(|e| run.fail(Step::InstallDependencies, e))?;
    run.finish(Step::InstallDependencies, "Dependencies installed");

    run.begin(Step::WriteEnvironment);
    files::write_environment(host.fs(), config, &opts.tuning)
        .map_err(|e| run.fail(Step::WriteEnvironment, e))?;
    run.finish(
        Step::WriteEnvironment,
        &format!("Wrote {}", config.env_file_path().display()),
    );

    run.begin(Step::PrepareRuntimeDirs);
    let removed = files::prepare_runtime_dirs(host.fs(), config, reporter)
        .map_err(|e| run.fail(Step::PrepareRuntimeDirs, e))?;
    run.finish(Step::PrepareRuntimeDirs, "Runtime directories ready");

    run.begin(Step::RegisterService);
    let registration = supervisor::register_service(host.supervisor(), host.fs(), config)
        .await
        .map_err(|e| run.fail(Step::RegisterService, e))?;
    run.finish(
        Step::RegisterService,
        if registration.changed {
            "Unit file written and enabled"
        } else {
            "Unit file unchanged, enabled"
        },
    );

    run.begin(Step::StartService);
    supervisor::start_service(host.supervisor(), config)
        .await
        .map_err(|e| run.fail(Step::StartService, e))?;
    run.finish(Step::StartService, &format!("{} (re)started", config.service_name));

    run.begin(Step::HealthCheck);
    let health = health::health_check(host.probe(), config, opts.health_delay).await;
    run.settle_health(&health, opts.require_healthy)?;

    Ok(ProvisionReport {
        service: config.service_name.clone(),
        install_dir: config.install_dir.clone(),
        unit_path: registration.unit_path,
        completed: run.completed,
        warnings: run.warnings,
        commit: Some(source.commit),
        source: Some(source.action),
        dependencies: Some(deps),
        removed,
        unit_changed: registration.changed,
        health,
        finished_at: Utc::now(),
    })
}

/// Abbreviated commit hash for display.
#[must_use]
pub fn short(commit: &str) -> &str {
    commit.get(..12).unwrap_or(commit)
}
