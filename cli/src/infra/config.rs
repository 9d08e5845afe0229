//! Infrastructure implementation of the `ConfigStore` port.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::ports::ConfigStore;
use crate::domain::config::ProvisionSettings;

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
///
/// An explicitly named file must exist; the default location is optional.
pub struct YamlConfigStore {
    explicit: Option<PathBuf>,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }
}

/// `<config_dir>/kiln/config.yaml`, e.g. `/root/.config/kiln/config.yaml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("kiln").join("config.yaml"))
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<ProvisionSettings> {
        let Some(path) = self.path() else {
            return Ok(ProvisionSettings::default());
        };
        if self.explicit.is_none() && !path.exists() {
            return Ok(ProvisionSettings::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(ProvisionSettings::default());
        }
        tracing::debug!(path = %path.display(), "loading config file");
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn path(&self) -> Option<PathBuf> {
        self.explicit.clone().or_else(default_config_path)
    }
}
