//! Post-start health check step.

use std::time::Duration;

use crate::application::ports::HealthProbe;
use crate::domain::config::ProvisionConfig;
use crate::domain::health::{HealthStatus, ProbeTarget};

/// Wait `delay`, then issue a single probe against the status endpoint.
///
/// Never fails: an unreachable service is reported as
/// [`HealthStatus::Unhealthy`] and the caller decides how fatal that is.
pub async fn health_check(
    probe: &impl HealthProbe,
    config: &ProvisionConfig,
    delay: Duration,
) -> HealthStatus {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    let target = ProbeTarget::new(&config.host, config.port, config.bearer.as_deref());
    probe_once(probe, &target).await
}

/// One request against `target`, classified.
pub async fn probe_once(probe: &impl HealthProbe, target: &ProbeTarget) -> HealthStatus {
    tracing::debug!(url = %target.url, authenticated = target.bearer.is_some(), "probing");
    match probe.probe(target).await {
        Ok(code) => HealthStatus::from_code(code),
        Err(e) => HealthStatus::Unhealthy {
            reason: format!("{e:#}"),
        },
    }
}
