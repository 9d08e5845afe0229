//! Source checkout step.

use crate::application::ports::{HostFs, ProgressReporter, SourceControl};
use crate::application::services::provision::OrStep;
use crate::domain::config::ProvisionConfig;
use crate::domain::error::ProvisionError;
use crate::domain::report::SourceAction;

/// Result of syncing the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOutcome {
    pub commit: String,
    pub action: SourceAction,
}

/// Clone the configured branch, or force an existing checkout to the
/// remote branch tip.
///
/// An existing checkout is re-pointed at the configured repository URL,
/// fetched, and hard-reset. Local commits and modified tracked files are
/// reported before they are discarded.
///
/// # Errors
///
/// Returns [`ProvisionError::Source`] if any git operation fails.
pub async fn sync_source(
    scm: &impl SourceControl,
    fs: &impl HostFs,
    config: &ProvisionConfig,
    reporter: &impl ProgressReporter,
) -> Result<SourceOutcome, ProvisionError> {
    let dir = &config.install_dir;

    let action = if fs.exists(&config.git_dir()) {
        scm.set_origin(dir, &config.repo_url)
            .await
            .or_step(ProvisionError::Source)?;
        scm.fetch_all(dir).await.or_step(ProvisionError::Source)?;
        let divergence = scm
            .divergence(dir, &config.branch)
            .await
            .or_step(ProvisionError::Source)?;
        for commit in &divergence.local_commits {
            tracing::warn!(%commit, "hard reset discards local commit");
            reporter.warn(&format!("discarding local commit {commit}"));
        }
        for file in &divergence.modified_files {
            tracing::warn!(%file, "hard reset discards local modification");
            reporter.warn(&format!("discarding local changes to {file}"));
        }
        scm.hard_reset(dir, &config.branch)
            .await
            .or_step(ProvisionError::Source)?;
        SourceAction::Reset {
            discarded_commits: divergence.local_commits,
            discarded_files: divergence.modified_files,
        }
    } else {
        scm.clone_branch(&config.repo_url, &config.branch, dir)
            .await
            .or_step(ProvisionError::Source)?;
        SourceAction::Cloned
    };

    let commit = scm
        .head_commit(dir)
        .await
        .or_step(ProvisionError::Source)?;
    Ok(SourceOutcome { commit, action })
}
