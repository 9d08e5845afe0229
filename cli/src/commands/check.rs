//! `kiln check`: is the installed service running and answering?

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::{ConfigStore, HostEnvironment};
use crate::application::services::check::check_service;
use crate::domain::config::{DEFAULT_INSTALL_ROOT, DEFAULT_SERVICE};
use crate::infra::host::LinuxHost;
use crate::infra::systemd::SYSTEM_UNIT_DIR;
use crate::output::human::HumanRenderer;
use crate::output::json;

/// Arguments for the check command.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Unit name [default: tg-mirror]
    #[arg(long, env = "KILN_SERVICE", value_name = "NAME")]
    pub service: Option<String>,

    /// Installation directory [default: /opt/<service>]
    #[arg(long, env = "KILN_DIR", value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Seconds to wait for the status endpoint
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    pub timeout_secs: u64,
}

/// Run the check command. Exits non-zero when the service is unhealthy.
///
/// # Errors
///
/// Returns an error if the config file cannot be loaded, the service is not
/// installed at the resolved directory, or systemd cannot be queried.
pub async fn run(app: &AppContext, args: &CheckArgs) -> Result<ExitCode> {
    let file = app.config_store.load()?;
    let service = args
        .service
        .clone()
        .or(file.service)
        .unwrap_or_else(|| DEFAULT_SERVICE.to_string());
    let dir = args
        .dir
        .clone()
        .or(file.dir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INSTALL_ROOT).join(&service));

    let host = LinuxHost::new(PathBuf::from(SYSTEM_UNIT_DIR))
        .with_probe_timeout(Duration::from_secs(args.timeout_secs));
    let report =
        check_service(host.fs(), host.supervisor(), host.probe(), &service, &dir).await?;

    if app.is_json() {
        json::print(&report)?;
    } else {
        HumanRenderer::new(&app.output).render_check(&report);
    }
    Ok(if report.is_healthy() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
