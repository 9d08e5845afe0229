//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with a guaranteed timeout and kill.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::io::AsyncReadExt;

use crate::application::ports::CommandRunner;

/// Default timeout for short host commands (systemctl, timedatectl, git queries).
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(120);

/// Package index refresh and installs, virtualenv dependency installs.
pub const INSTALL_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Clone and fetch of the service repository.
pub const NETWORK_GIT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Lines of stderr kept in an error message.
const STDERR_TAIL_LINES: usize = 20;

/// Production `CommandRunner`.
///
/// `tokio::time::timeout` around `.output().await` only drops the future;
/// this implementation uses `tokio::select!` with explicit `child.kill()`
/// so a hung installer never outlives its step.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CMD_TIMEOUT)
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        tracing::debug!(program, ?args, timeout_secs = timeout.as_secs(), "running");
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stdout_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stderr_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                );
                let output = Output {
                    status: status.with_context(|| format!("waiting for {program}"))?,
                    stdout,
                    stderr,
                };
                tracing::debug!(program, status = %output.status, "finished");
                Ok(output)
            } => result,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                bail!("{program} timed out after {}s", timeout.as_secs())
            }
        }
    }
}

/// Fail with the tail of stderr when `output` reports a non-zero exit.
///
/// # Errors
///
/// Returns an error describing `what` and the process's own diagnostics.
pub fn ensure_success(output: &Output, what: &str) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let diagnostics = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };
    let lines: Vec<&str> = diagnostics.lines().collect();
    let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
    if tail.is_empty() {
        bail!("{what} failed ({})", output.status);
    }
    bail!("{what} failed ({}):\n{tail}", output.status)
}

/// Run a command and require a zero exit. Failures are labelled with the
/// program and its first argument.
///
/// # Errors
///
/// Returns an error if the command cannot run, times out, or exits non-zero.
pub async fn run_checked(
    runner: &impl CommandRunner,
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<Output> {
    let label = match args.first() {
        Some(first) => format!("{program} {first}"),
        None => program.to_string(),
    };
    run_checked_as(runner, &label, program, args, timeout).await
}

/// [`run_checked`] with an explicit `label` for failure messages, for
/// commands whose first arguments are global options.
///
/// # Errors
///
/// Returns an error if the command cannot run, times out, or exits non-zero.
pub async fn run_checked_as(
    runner: &impl CommandRunner,
    label: &str,
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<Output> {
    let output = runner.run_with_timeout(program, args, timeout).await?;
    ensure_success(&output, label)?;
    Ok(output)
}
