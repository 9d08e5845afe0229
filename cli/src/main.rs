//! kiln - provision a git-hosted service and run it under systemd

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use kiln_cli::cli::Cli;
use kiln_cli::domain::error::{ProvisionError, StepFailure};
use kiln_cli::output::{OutputContext, json};

/// Diagnostics go to stderr; `KILN_LOG` takes `EnvFilter` directives.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("KILN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Message, machine-readable code and failing step of an error.
///
/// A `StepFailure` already renders its cause, so its chain is not appended.
fn classify(err: &anyhow::Error) -> (String, &'static str, Option<&'static str>) {
    if let Some(failure) = err.downcast_ref::<StepFailure>() {
        return (
            failure.to_string(),
            failure.source.code(),
            Some(failure.step.name()),
        );
    }
    if let Some(error) = err.downcast_ref::<ProvisionError>() {
        return (error.to_string(), error.code(), None);
    }
    (format!("{err:#}"), "ERROR", None)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let (json_mode, no_color) = (cli.json, cli.no_color);

    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            let (message, code, step) = classify(&e);
            if json_mode {
                match json::format_error(&message, code, step) {
                    Ok(out) => println!("{out}"),
                    Err(_) => eprintln!("Error: {message}"),
                }
            } else {
                let ctx = OutputContext::new(no_color, false);
                ctx.error(&format!("Error: {message}"));
                if code == "CONFIG_ERROR" {
                    eprintln!(
                        "\nUsage: kiln provision --repo <URL> --api-id <ID> --api-hash <HASH> [OPTIONS]\n\
                         Run 'kiln provision --help' for all options."
                    );
                }
            }
            ExitCode::FAILURE
        }
    }
}
