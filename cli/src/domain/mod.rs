//! Domain layer: pure provisioning types, validation and renderers.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod env_file;
pub mod error;
pub mod health;
pub mod report;
pub mod step;
pub mod unit;

pub use config::{ProvisionConfig, ProvisionSettings};
pub use env_file::{EnvironmentFile, TuningConstants};
pub use error::{ProvisionError, StepFailure};
pub use health::{HealthStatus, ProbeTarget};
pub use report::{CheckReport, ProvisionPlan, ProvisionReport, StepWarning};
pub use step::Step;
pub use unit::ServiceUnit;
