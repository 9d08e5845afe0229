//! Typed provisioning errors.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! Ports report failures as `anyhow::Error`; step functions fold them into
//! a [`ProvisionError`] at the step boundary.

use thiserror::Error;

use crate::domain::step::{STEP_COUNT, Step};

/// Error taxonomy of the provisioning pipeline, one variant per failure class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("package installation failed: {0}")]
    Package(String),

    #[error("filesystem operation failed: {0}")]
    Filesystem(String),

    #[error("source sync failed: {0}")]
    Source(String),

    #[error("dependency installation failed: {0}")]
    Dependency(String),

    #[error("service supervisor failed: {0}")]
    Supervisor(String),

    #[error("service did not become healthy: {0}")]
    Health(String),
}

impl ProvisionError {
    /// Machine-readable code used by `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Package(_) => "PACKAGE_ERROR",
            Self::Filesystem(_) => "FILESYSTEM_ERROR",
            Self::Source(_) => "SOURCE_ERROR",
            Self::Dependency(_) => "DEPENDENCY_ERROR",
            Self::Supervisor(_) => "SUPERVISOR_ERROR",
            Self::Health(_) => "HEALTH_ERROR",
        }
    }
}

/// A fatal error paired with the step that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("step {}/{} ({}) failed: {}", .step.number(), STEP_COUNT, .step, .source)]
pub struct StepFailure {
    pub step: Step,
    #[source]
    pub source: ProvisionError,
}

impl StepFailure {
    #[must_use]
    pub fn new(step: Step, source: ProvisionError) -> Self {
        Self { step, source }
    }
}
