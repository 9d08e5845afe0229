//! Terminal output: styling, progress and renderers.
//!
//! Results go to stdout. Spinners, errors and diagnostics go to stderr, so
//! `kiln plan --json > plan.json` stays parseable.

pub mod human;
pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::{OwoColorize as _, Style};
pub use styles::Styles;

/// Width of the key column in summary lines.
const KEY_WIDTH: usize = 14;

/// Where and how kiln prints.
pub struct OutputContext {
    pub styles: Styles,
    /// Spinners draw on stderr and are only used when it is a terminal.
    pub stderr_is_term: bool,
    /// Suppress everything except errors.
    pub quiet: bool,
}

impl OutputContext {
    /// Colors need a terminal on stdout and neither `--no-color` nor
    /// `NO_COLOR`.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        let colors = !no_color && !no_color_env && Term::stdout().is_term();
        Self {
            styles: if colors {
                Styles::colored()
            } else {
                Styles::default()
            },
            stderr_is_term: Term::stderr().is_term(),
            quiet,
        }
    }

    /// Whether step progress is drawn as spinners.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.stderr_is_term && !self.quiet
    }

    fn marked(&self, mark: &str, style: Style, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", mark.style(style));
        }
    }

    /// `✓ msg`
    pub fn success(&self, msg: &str) {
        self.marked("✓", self.styles.success, msg);
    }

    /// `! msg`
    pub fn warn(&self, msg: &str) {
        self.marked("!", self.styles.warning, msg);
    }

    /// `· msg`, for neutral facts such as a probe that was skipped.
    pub fn note(&self, msg: &str) {
        self.marked("·", self.styles.dim, msg);
    }

    /// `✗ msg` on stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Aligned `key value` summary line.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {:<KEY_WIDTH$}{value}", key.style(self.styles.dim));
        }
    }
}
