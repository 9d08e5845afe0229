//! Step spinners using indicatif.

#![allow(clippy::expect_used)] // Templates are compile-time constants

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK: Duration = Duration::from_millis(100);

/// Spinner for a running step; the elapsed time matters for long installs.
///
/// # Panics
///
/// Never in practice: the template is a constant.
#[must_use]
pub fn spinner(msg: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("  {spinner:.cyan} {msg} ({elapsed})")
        .expect("valid template")
        .tick_chars("-\\|/ ");
    let pb = ProgressBar::new_spinner()
        .with_style(style)
        .with_message(msg.to_owned());
    pb.enable_steady_tick(TICK);
    pb
}

/// Freeze the spinner line as `mark msg`.
pub fn finish_with(pb: &ProgressBar, mark: &str, msg: &str) {
    pb.set_style(ProgressStyle::with_template("  {prefix} {msg}").expect("valid template"));
    pb.set_prefix(mark.to_owned());
    pb.finish_with_message(msg.to_owned());
}
