//! Filesystem steps: installation directory, environment file, runtime dirs.

use std::path::PathBuf;

use crate::application::ports::{HostFs, ProgressReporter};
use crate::application::services::provision::OrStep;
use crate::domain::config::ProvisionConfig;
use crate::domain::env_file::{EnvironmentFile, TuningConstants};
use crate::domain::error::ProvisionError;

/// The environment file holds credentials.
pub const ENV_FILE_MODE: u32 = 0o600;

/// Create the installation directory and hand it to the service user.
///
/// # Errors
///
/// Returns [`ProvisionError::Filesystem`] on any filesystem failure.
pub fn prepare_directory(fs: &impl HostFs, config: &ProvisionConfig) -> Result<(), ProvisionError> {
    let dir = &config.install_dir;
    fs.create_dir_all(dir).or_step(ProvisionError::Filesystem)?;
    fs.set_owner(dir, &config.user, true)
        .or_step(ProvisionError::Filesystem)
}

/// Regenerate the environment file in full.
///
/// Any previous content, including manual edits, is replaced.
///
/// # Errors
///
/// Returns [`ProvisionError::Filesystem`] if the file cannot be written,
/// restricted, or handed to the service user.
pub fn write_environment(
    fs: &impl HostFs,
    config: &ProvisionConfig,
    tuning: &TuningConstants,
) -> Result<(), ProvisionError> {
    let path = config.env_file_path();
    let content = EnvironmentFile::new(config, tuning).render();
    fs.write_private(&path, &content, ENV_FILE_MODE)
        .or_step(ProvisionError::Filesystem)?;
    fs.set_owner(&path, &config.user, false)
        .or_step(ProvisionError::Filesystem)
}

/// Create the session working directories, wiping run-state first when
/// `config.reset` is set.
///
/// Returns the paths that were removed.
///
/// # Errors
///
/// Returns [`ProvisionError::Filesystem`] on any filesystem failure.
pub fn prepare_runtime_dirs(
    fs: &impl HostFs,
    config: &ProvisionConfig,
    reporter: &impl ProgressReporter,
) -> Result<Vec<PathBuf>, ProvisionError> {
    let mut removed = Vec::new();
    if config.reset {
        let state_file = config.state_file_path();
        for path in [
            state_file.clone(),
            config.sessions_dir(),
            config.pending_sessions_dir(),
        ] {
            if !fs.exists(&path) {
                continue;
            }
            tracing::warn!(path = %path.display(), "reset: deleting run state");
            reporter.warn(&format!("reset: deleting {}", path.display()));
            if path == state_file {
                fs.remove_file(&path)
            } else {
                fs.remove_dir_all(&path)
            }
            .or_step(ProvisionError::Filesystem)?;
            removed.push(path);
        }
    }

    for dir in [config.sessions_dir(), config.pending_sessions_dir()] {
        fs.create_dir_all(&dir).or_step(ProvisionError::Filesystem)?;
        fs.set_owner(&dir, &config.user, true)
            .or_step(ProvisionError::Filesystem)?;
    }
    Ok(removed)
}
