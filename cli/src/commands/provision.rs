//! `kiln provision`: bring the service up on this host.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args};

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::provision::{ProvisionOptions, provision};
use crate::domain::config::{
    IdValue, PENDING_SESSIONS_DIR, ProvisionConfig, ProvisionSettings, SESSIONS_DIR, STATE_FILE,
};
use crate::domain::env_file::TuningConstants;
use crate::domain::error::StepFailure;
use crate::domain::step::Step;
use crate::infra::host::{LinuxHost, invoking_user, is_root};
use crate::infra::systemd::SYSTEM_UNIT_DIR;
use crate::output::human::HumanRenderer;
use crate::output::json;
use crate::output::reporter::TerminalReporter;

/// Target description shared by `provision` and `plan`.
///
/// Every value may also come from a `KILN_*` environment variable or the
/// config file; flags and environment win over the file.
#[derive(Args, Debug, Clone)]
pub struct ProvisionArgs {
    /// Git repository of the service [required]
    #[arg(long, env = "KILN_REPO", value_name = "URL")]
    pub repo: Option<String>,

    /// Branch to deploy [default: main]
    #[arg(long, env = "KILN_BRANCH")]
    pub branch: Option<String>,

    /// Numeric API identifier [required]
    #[arg(long, env = "KILN_API_ID", value_name = "ID")]
    pub api_id: Option<String>,

    /// API secret [required]
    #[arg(long, env = "KILN_API_HASH", value_name = "HASH", hide_env_values = true)]
    pub api_hash: Option<String>,

    /// Bearer token protecting the service's HTTP API
    #[arg(long, env = "KILN_BEARER", value_name = "TOKEN", hide_env_values = true)]
    pub bearer: Option<String>,

    /// Address the service binds [default: 0.0.0.0]
    #[arg(long, env = "KILN_HOST")]
    pub host: Option<String>,

    /// Port the service binds [default: 8080]
    #[arg(long, env = "KILN_PORT")]
    pub port: Option<u16>,

    /// Unit name [default: tg-mirror]
    #[arg(long, env = "KILN_SERVICE", value_name = "NAME")]
    pub service: Option<String>,

    /// Account the service runs as [default: invoking user]
    #[arg(long, env = "KILN_USER")]
    pub user: Option<String>,

    /// Installation directory [default: /opt/<service>]
    #[arg(long, env = "KILN_DIR", value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Script started by the unit, relative to the install dir [default: app.py]
    #[arg(long, env = "KILN_ENTRYPOINT", value_name = "FILE")]
    pub entrypoint: Option<String>,

    /// Directory unit files are written to
    #[arg(long, env = "KILN_UNIT_DIR", value_name = "PATH", default_value = SYSTEM_UNIT_DIR)]
    pub unit_dir: PathBuf,

    /// Seconds to wait after starting the service before probing it
    #[arg(long, env = "KILN_HEALTH_DELAY_SECS", value_name = "SECS", default_value_t = 3)]
    pub health_delay_secs: u64,

    /// Fail the run when the health check fails
    #[arg(
        long,
        env = "KILN_REQUIRE_HEALTHY",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub require_healthy: bool,

    /// Delete state.json and the session directories before starting
    #[arg(long)]
    pub reset: bool,
}

impl ProvisionArgs {
    /// The flag/environment layer of the settings.
    #[must_use]
    pub fn settings(&self) -> ProvisionSettings {
        ProvisionSettings {
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            api_id: self.api_id.clone().map(IdValue::Text),
            api_hash: self.api_hash.clone(),
            bearer: self.bearer.clone(),
            host: self.host.clone(),
            port: self.port,
            service: self.service.clone(),
            user: self.user.clone(),
            dir: self.dir.clone(),
            entrypoint: self.entrypoint.clone(),
        }
    }

    #[must_use]
    pub fn options(&self) -> ProvisionOptions {
        ProvisionOptions {
            tuning: TuningConstants::default(),
            health_delay: Duration::from_secs(self.health_delay_secs),
            require_healthy: self.require_healthy,
        }
    }

    /// Stack flags over the config file and fill in defaults.
    ///
    /// The result is not validated; that is the first provisioning step.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn resolve(&self, store: &impl ConfigStore) -> Result<ProvisionConfig> {
        let file = store.load()?;
        Ok(self
            .settings()
            .or(file)
            .into_config(self.reset, invoking_user()))
    }
}

/// Run the provision command.
///
/// # Errors
///
/// Returns the [`StepFailure`](crate::domain::error::StepFailure) of the
/// first fatal step, or an error if the configuration cannot be loaded or
/// the user declines the reset.
pub async fn run(app: &AppContext, args: &ProvisionArgs) -> Result<ExitCode> {
    let config = args.resolve(&app.config_store)?;

    if config.reset && !app.non_interactive {
        confirm_reset(&config, |prompt| app.confirm(prompt, false))?;
    }
    if !is_root() {
        tracing::warn!("not running as root");
        app.output
            .warn("not running as root: package and service steps will likely fail");
    }

    let host = LinuxHost::new(args.unit_dir.clone());
    let reporter = TerminalReporter::new(&app.output);
    let result = provision(&host, &config, &args.options(), &reporter).await;
    reporter.finish();
    let report = result?;

    if app.is_json() {
        json::print(&report)?;
    } else {
        HumanRenderer::new(&app.output).render_report(&report);
    }
    Ok(ExitCode::SUCCESS)
}

/// Ask before `--reset` deletes run-state. An invalid config fails here,
/// before the operator is asked anything.
fn confirm_reset(
    config: &ProvisionConfig,
    confirm: impl FnOnce(&str) -> Result<bool>,
) -> Result<()> {
    config
        .validate()
        .map_err(|err| StepFailure::new(Step::Validate, err))?;
    let prompt = format!(
        "--reset deletes {STATE_FILE}, {SESSIONS_DIR}/ and {PENDING_SESSIONS_DIR}/ in {}. Continue?",
        config.install_dir.display()
    );
    if !confirm(&prompt)? {
        bail!("aborted, run-state left untouched");
    }
    Ok(())
}
