//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, Subcommand};

use crate::app::{AppContext, GlobalFlags};
use crate::commands;

/// Provision a git-hosted service and run it under systemd
#[derive(Parser)]
#[command(
    name = "kiln",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Log diagnostics at debug level (overrides KILN_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Answer yes to confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Config file [default: <config dir>/kiln/config.yaml]
    #[arg(long, global = true, env = "KILN_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install, configure and start the service
    Provision(commands::provision::ProvisionArgs),

    /// Show what provision would do, without changing anything
    Plan(commands::provision::ProvisionArgs),

    /// Check that the installed service is running and healthy
    Check(commands::check::CheckArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            yes,
            config,
            command,
            ..
        } = self;
        let app = AppContext::new(GlobalFlags {
            json,
            quiet,
            no_color,
            yes,
            config,
        });

        match command {
            Command::Provision(args) => commands::provision::run(&app, &args).await,
            Command::Plan(args) => commands::plan::run(&app, &args),
            Command::Check(args) => commands::check::run(&app, &args).await,
            Command::Version => Ok(commands::version::run(&app)),
        }
    }
}
