//! Application context handed to every command handler.
//!
//! Holds what all commands share: how to print, where the config file lives,
//! and whether kiln may stop to ask questions.

use std::path::PathBuf;

use anyhow::Result;
use console::Term;

use crate::infra::config::YamlConfigStore;
use crate::output::OutputContext;

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    /// One JSON document on stdout; progress is suppressed.
    Json,
}

/// Global command-line flags, as parsed.
#[derive(Debug, Default)]
pub struct GlobalFlags {
    pub json: bool,
    pub quiet: bool,
    pub no_color: bool,
    pub yes: bool,
    /// `--config` / `KILN_CONFIG`.
    pub config: Option<PathBuf>,
}

pub struct AppContext {
    /// Quiet in JSON mode so stdout stays parseable.
    pub output: OutputContext,
    pub mode: OutputMode,
    /// File layer of the provisioning settings.
    pub config_store: YamlConfigStore,
    /// Never prompt: `--yes`, `CI`, `KILN_YES`, or stdout is not a terminal.
    pub non_interactive: bool,
}

impl AppContext {
    #[must_use]
    pub fn new(flags: GlobalFlags) -> Self {
        let assume_yes = flags.yes
            || std::env::var_os("CI").is_some()
            || std::env::var_os("KILN_YES").is_some();
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Self {
            output: OutputContext::new(flags.no_color, flags.quiet || flags.json),
            mode,
            config_store: YamlConfigStore::new(flags.config),
            non_interactive: assume_yes || !Term::stdout().is_term(),
        }
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Ask a yes/no question; `default` is returned without asking when
    /// prompts are disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        Ok(dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}
