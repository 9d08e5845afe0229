//! `HealthProbe` over plain HTTP using ureq.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::HealthProbe;
use crate::domain::health::ProbeTarget;

/// Single-request timeout for the status endpoint.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct UreqHealthProbe {
    timeout: Duration,
}

impl UreqHealthProbe {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for UreqHealthProbe {
    fn default() -> Self {
        Self::new(PROBE_TIMEOUT)
    }
}

/// Blocking probe; returns the status code of any HTTP response.
fn probe_blocking(target: &ProbeTarget, timeout: Duration) -> Result<u16> {
    let req = ureq::get(&target.url)
        .timeout(timeout)
        .set("User-Agent", concat!("kiln/", env!("CARGO_PKG_VERSION")));
    let req = match &target.bearer {
        Some(token) => req.set("Authorization", &format!("Bearer {token}")),
        None => req,
    };
    match req.call() {
        Ok(resp) => Ok(resp.status()),
        Err(ureq::Error::Status(code, _)) => Ok(code),
        Err(e) => Err(anyhow::Error::new(e)).with_context(|| format!("GET {}", target.url)),
    }
}

impl HealthProbe for UreqHealthProbe {
    async fn probe(&self, target: &ProbeTarget) -> Result<u16> {
        let target = target.clone();
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || probe_blocking(&target, timeout))
            .await
            .context("spawn_blocking for health probe")?
    }
}
