//! Results of provisioning runs and dry-run plans.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::health::HealthStatus;
use crate::domain::step::Step;

/// A non-fatal problem recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepWarning {
    pub step: Step,
    pub message: String,
}

/// How the working tree was brought to the branch tip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SourceAction {
    Cloned,
    Reset {
        /// Local commits that were discarded.
        discarded_commits: Vec<String>,
        /// Tracked files whose local modifications were discarded.
        discarded_files: Vec<String>,
    },
}

/// Which dependency set was installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DependencySource {
    Manifest { path: PathBuf },
    Fallback { packages: Vec<String> },
}

/// Summary of a successful provisioning run.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    pub service: String,
    pub install_dir: PathBuf,
    pub unit_path: PathBuf,
    pub completed: Vec<Step>,
    pub warnings: Vec<StepWarning>,
    pub commit: Option<String>,
    pub source: Option<SourceAction>,
    pub dependencies: Option<DependencySource>,
    /// Run-state paths removed because of `--reset`.
    pub removed: Vec<PathBuf>,
    pub unit_changed: bool,
    pub health: HealthStatus,
    pub finished_at: DateTime<Utc>,
}

/// One step as it would run.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedStep {
    pub step: Step,
    pub number: usize,
    pub detail: String,
}

/// Side-effect-free preview of a provisioning run.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionPlan {
    pub service: String,
    pub install_dir: PathBuf,
    pub steps: Vec<PlannedStep>,
    /// Environment file with credentials masked.
    pub env_file: String,
    pub unit_path: PathBuf,
    pub unit: String,
}

/// State of an installed service as seen by `check`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub service: String,
    pub install_dir: PathBuf,
    /// Whether the supervisor reports the unit as active.
    pub active: bool,
    /// Status URL read back from the environment file.
    pub url: String,
    pub health: HealthStatus,
}

impl CheckReport {
    /// Healthy means running and answering the status endpoint.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.active && self.health.is_healthy()
    }
}
