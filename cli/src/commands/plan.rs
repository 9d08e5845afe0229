//! `kiln plan`: show what `provision` would do, without doing it.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::HostEnvironment;
use crate::application::services::plan::plan;
use crate::commands::provision::ProvisionArgs;
use crate::infra::host::LinuxHost;
use crate::output::human::HumanRenderer;
use crate::output::json;

/// Run the plan command.
///
/// # Errors
///
/// Returns an error if the config file cannot be loaded or the resolved
/// configuration is invalid.
pub fn run(app: &AppContext, args: &ProvisionArgs) -> Result<ExitCode> {
    let config = args.resolve(&app.config_store)?;
    let host = LinuxHost::new(args.unit_dir.clone());
    let plan = plan(host.fs(), host.supervisor(), &config, &args.options())?;

    if app.is_json() {
        json::print(&plan)?;
    } else {
        HumanRenderer::new(&app.output).render_plan(&plan);
    }
    Ok(ExitCode::SUCCESS)
}
