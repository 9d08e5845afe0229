//! The ordered provisioning steps.

use std::fmt;

use serde::Serialize;

/// Total number of provisioning steps.
pub const STEP_COUNT: usize = Step::ALL.len();

/// One stage of the provisioning pipeline.
///
/// Steps run strictly in the order of [`Step::ALL`]; every step is a
/// precondition for the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Validate,
    SyncClock,
    InstallPackages,
    PrepareDirectory,
    SyncSource,
    InstallDependencies,
    WriteEnvironment,
    PrepareRuntimeDirs,
    RegisterService,
    StartService,
    HealthCheck,
}

impl Step {
    /// All steps in execution order.
    pub const ALL: [Step; 11] = [
        Step::Validate,
        Step::SyncClock,
        Step::InstallPackages,
        Step::PrepareDirectory,
        Step::SyncSource,
        Step::InstallDependencies,
        Step::WriteEnvironment,
        Step::PrepareRuntimeDirs,
        Step::RegisterService,
        Step::StartService,
        Step::HealthCheck,
    ];

    /// 1-based position of the step in the pipeline.
    #[must_use]
    pub fn number(self) -> usize {
        Self::ALL
            .iter()
            .position(|s| *s == self)
            .map_or(0, |i| i + 1)
    }

    /// Stable kebab-case identifier, used in logs and JSON output.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Step::Validate => "validate",
            Step::SyncClock => "sync-clock",
            Step::InstallPackages => "install-packages",
            Step::PrepareDirectory => "prepare-directory",
            Step::SyncSource => "sync-source",
            Step::InstallDependencies => "install-dependencies",
            Step::WriteEnvironment => "write-environment",
            Step::PrepareRuntimeDirs => "prepare-runtime-dirs",
            Step::RegisterService => "register-service",
            Step::StartService => "start-service",
            Step::HealthCheck => "health-check",
        }
    }

    /// Human-readable progress line for the step.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Step::Validate => "validating configuration",
            Step::SyncClock => "synchronizing system clock",
            Step::InstallPackages => "installing system packages",
            Step::PrepareDirectory => "preparing installation directory",
            Step::SyncSource => "syncing source checkout",
            Step::InstallDependencies => "installing runtime dependencies",
            Step::WriteEnvironment => "writing environment file",
            Step::PrepareRuntimeDirs => "preparing runtime directories",
            Step::RegisterService => "registering service unit",
            Step::StartService => "starting service",
            Step::HealthCheck => "checking service health",
        }
    }

    /// Whether a failure in this step aborts the run.
    ///
    /// Clock sync and the health check only ever produce warnings (unless
    /// the caller opts into a strict health check).
    #[must_use]
    pub fn is_fatal(self) -> bool {
        !matches!(self, Step::SyncClock | Step::HealthCheck)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
