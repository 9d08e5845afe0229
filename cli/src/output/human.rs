//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::domain::health::HealthStatus;
use crate::domain::report::{
    CheckReport, DependencySource, ProvisionPlan, ProvisionReport, SourceAction,
};
use crate::domain::step::STEP_COUNT;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("kiln {version}");
    }

    /// Render the summary printed after a successful run.
    pub fn render_report(&self, report: &ProvisionReport) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.header(&format!("{} provisioned", report.service));
        self.ctx
            .kv("Directory:", &report.install_dir.display().to_string());
        if let Some(commit) = &report.commit {
            self.ctx
                .kv("Commit:", &format!("{commit} ({})", source_display(report.source.as_ref())));
        }
        if let Some(deps) = &report.dependencies {
            self.ctx.kv("Dependencies:", &dependencies_display(deps));
        }
        let unit_state = if report.unit_changed {
            "updated"
        } else {
            "unchanged"
        };
        self.ctx.kv(
            "Unit:",
            &format!("{} ({unit_state})", report.unit_path.display()),
        );
        for path in &report.removed {
            self.ctx.kv("Removed:", &path.display().to_string());
        }
        self.ctx.kv("Health:", &health_display(&report.health));
        self.ctx.kv(
            "Steps:",
            &format!(
                "{}/{STEP_COUNT} completed, {} warning(s)",
                report.completed.len(),
                report.warnings.len()
            ),
        );
    }

    /// Render a dry-run plan.
    pub fn render_plan(&self, plan: &ProvisionPlan) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.header(&format!(
            "Plan for {} in {}",
            plan.service,
            plan.install_dir.display()
        ));
        println!();
        for planned in &plan.steps {
            println!(
                "  {:>2}. {:<22} {}",
                planned.number,
                planned.step.name().style(self.ctx.styles.bold),
                planned.detail
            );
        }
        println!();
        self.ctx.header(".env");
        for line in plan.env_file.lines() {
            println!("    {}", line.style(self.ctx.styles.dim));
        }
        println!();
        self.ctx.header(&plan.unit_path.display().to_string());
        for line in plan.unit.lines() {
            println!("    {}", line.style(self.ctx.styles.dim));
        }
    }

    /// Render the state of an installed service.
    pub fn render_check(&self, report: &CheckReport) {
        if report.active {
            self.ctx.success(&format!("{} is active", report.service));
        } else {
            self.ctx.warn(&format!("{} is not active", report.service));
        }
        match &report.health {
            HealthStatus::Healthy { code } => {
                self.ctx.success(&format!("{} answered {code}", report.url));
            }
            HealthStatus::Unhealthy { reason } => {
                self.ctx.warn(&format!("{}: {reason}", report.url));
            }
            HealthStatus::Skipped => self.ctx.note("Status endpoint not probed"),
        }
    }
}

/// One-word summary of how the tree was synced.
#[must_use]
pub fn source_display(action: Option<&SourceAction>) -> String {
    match action {
        Some(SourceAction::Cloned) => "fresh clone".to_string(),
        Some(SourceAction::Reset {
            discarded_commits,
            discarded_files,
        }) if discarded_commits.is_empty() && discarded_files.is_empty() => {
            "reset, nothing discarded".to_string()
        }
        Some(SourceAction::Reset {
            discarded_commits,
            discarded_files,
        }) => format!(
            "reset, discarded {} commit(s) and {} modified file(s)",
            discarded_commits.len(),
            discarded_files.len()
        ),
        None => "unknown".to_string(),
    }
}

#[must_use]
pub fn dependencies_display(deps: &DependencySource) -> String {
    match deps {
        DependencySource::Manifest { path } => path.display().to_string(),
        DependencySource::Fallback { packages } => {
            format!("fallback set ({})", packages.join(" "))
        }
    }
}

#[must_use]
pub fn health_display(health: &HealthStatus) -> String {
    match health {
        HealthStatus::Healthy { code } => format!("healthy (HTTP {code})"),
        HealthStatus::Unhealthy { reason } => format!("unhealthy: {reason}"),
        HealthStatus::Skipped => "not checked".to_string(),
    }
}
