//! Environment file rendering: pure functions, no I/O.
//!
//! The provisioned service reads a flat `KEY=value` file from its working
//! directory. The file is regenerated in full on every run; nothing from a
//! previous version survives.

use crate::domain::config::ProvisionConfig;

/// Keys written to the environment file, in output order.
pub const ENV_KEYS: [&str; 11] = [
    "API_ID",
    "API_HASH",
    "API_BEARER",
    "BIND_HOST",
    "BIND_PORT",
    "SCAN_INTERVAL_SEC",
    "BATCH_MAX",
    "SESS_RESCAN_SEC",
    "HEALTHCHECK_INTERVAL_SEC",
    "INCLUDE_MEDIA",
    "MEDIA_MAX_MB",
];

const SECRET_KEYS: [&str; 2] = ["API_HASH", "API_BEARER"];
const MASK: &str = "********";

/// Fixed tuning values handed to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuningConstants {
    /// Seconds between channel scans.
    pub scan_interval_sec: u32,
    /// Maximum messages fetched per scan.
    pub batch_max: u32,
    /// Seconds between session directory rescans.
    pub sess_rescan_sec: u32,
    /// Seconds between session health checks.
    pub healthcheck_interval_sec: u32,
    pub include_media: bool,
    /// Largest media attachment forwarded, in megabytes.
    pub media_max_mb: u32,
}

impl Default for TuningConstants {
    fn default() -> Self {
        Self {
            scan_interval_sec: 2,
            batch_max: 50,
            sess_rescan_sec: 20,
            healthcheck_interval_sec: 45,
            include_media: true,
            media_max_mb: 50,
        }
    }
}

/// Ordered key/value content of the environment file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentFile {
    entries: Vec<(&'static str, String)>,
}

impl EnvironmentFile {
    /// Build the file content from the run configuration and tuning values.
    #[must_use]
    pub fn new(config: &ProvisionConfig, tuning: &TuningConstants) -> Self {
        let values = [
            config.api_id.trim().to_string(),
            config.api_hash.clone(),
            config.bearer.clone().unwrap_or_default(),
            config.host.clone(),
            config.port.to_string(),
            tuning.scan_interval_sec.to_string(),
            tuning.batch_max.to_string(),
            tuning.sess_rescan_sec.to_string(),
            tuning.healthcheck_interval_sec.to_string(),
            tuning.include_media.to_string(),
            tuning.media_max_mb.to_string(),
        ];
        Self {
            entries: ENV_KEYS.into_iter().zip(values).collect(),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[(&'static str, String)] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render as `KEY=value` lines with a trailing newline.
    #[must_use]
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}={v}\n"))
            .collect()
    }

    /// Render with credentials replaced, for display.
    #[must_use]
    pub fn render_masked(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| {
                if SECRET_KEYS.contains(k) && !v.is_empty() {
                    format!("{k}={MASK}\n")
                } else {
                    format!("{k}={v}\n")
                }
            })
            .collect()
    }
}

/// Parse `KEY=value` lines, skipping blanks and `#` comments.
///
/// Values keep everything after the first `=`; surrounding matching quotes
/// are stripped.
#[must_use]
pub fn parse(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), unquote(v.trim()).to_string()))
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
