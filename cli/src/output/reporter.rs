//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.

use std::sync::Mutex;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `step()` prints `"  → {message}"`, or starts a spinner on a TTY
/// - `success()` prints `"  ✓ {message}"`, replacing the spinner
/// - `warn()` prints `"  ! {message}"` above any running spinner
///
/// Everything is suppressed when `ctx.quiet`.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    active: Mutex<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            active: Mutex::new(None),
        }
    }

    fn take_active(&self) -> Option<ProgressBar> {
        self.active.lock().ok().and_then(|mut slot| slot.take())
    }

    /// Clear a spinner left behind by a step that ended without `success()`.
    pub fn finish(&self) {
        if let Some(pb) = self.take_active() {
            pb.finish_and_clear();
        }
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        self.finish();
        if self.ctx.show_progress() {
            if let Ok(mut slot) = self.active.lock() {
                *slot = Some(progress::spinner(message));
            }
        } else {
            println!("  {} {message}", "→".style(self.ctx.styles.step));
        }
    }

    fn success(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        let mark = "✓".style(self.ctx.styles.success).to_string();
        match self.take_active() {
            Some(pb) => progress::finish_with(&pb, &mark, message),
            None => println!("  {mark} {message}"),
        }
    }

    fn warn(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        let line = format!("  {} {message}", "!".style(self.ctx.styles.warning));
        match self.active.lock().ok().as_deref().and_then(Option::as_ref) {
            Some(pb) => pb.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }
}
