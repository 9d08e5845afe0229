//! Health probe targets and outcome classification.
//!
//! This module is intentionally free of I/O, async, and external layer imports.

use serde::Serialize;

/// Path of the status endpoint exposed by the provisioned service.
pub const STATUS_PATH: &str = "/status";

/// Where and how to probe the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub url: String,
    pub bearer: Option<String>,
}

impl ProbeTarget {
    /// Build the status URL for a service bound to `host:port`.
    ///
    /// Wildcard bind addresses are probed over loopback.
    #[must_use]
    pub fn new(host: &str, port: u16, bearer: Option<&str>) -> Self {
        let probe_host = match host.trim() {
            "" | "0.0.0.0" => "127.0.0.1".to_string(),
            "::" | "[::]" => "[::1]".to_string(),
            h if h.contains(':') && !h.starts_with('[') => format!("[{h}]"),
            h => h.to_string(),
        };
        Self {
            url: format!("http://{probe_host}:{port}{STATUS_PATH}"),
            bearer: bearer.filter(|b| !b.is_empty()).map(str::to_owned),
        }
    }
}

/// Outcome of the health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HealthStatus {
    /// The endpoint answered with a 2xx status.
    Healthy { code: u16 },
    /// The endpoint answered with a non-2xx status, or did not answer.
    Unhealthy { reason: String },
    /// No probe was attempted.
    Skipped,
}

impl HealthStatus {
    /// Classify an HTTP status code returned by the endpoint.
    #[must_use]
    pub fn from_code(code: u16) -> Self {
        match code {
            200..=299 => Self::Healthy { code },
            401 | 403 => Self::Unhealthy {
                reason: format!("HTTP {code}: service is up but rejected the bearer token"),
            },
            _ => Self::Unhealthy {
                reason: format!("HTTP {code}"),
            },
        }
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy { .. })
    }
}
