//! Application service: read-only target inspection and manual unlock.
//!
//! `check_target` answers "would a deployment start here?" without touching
//! the target. `unlock_target` is the manual recovery path for a staging
//! directory left behind by an interrupted deployment.

use anyhow::Result;

use crate::application::ports::{ExecutionSession, ProgressReporter};
use crate::application::services::deploy::remove_staging_dir;
use crate::domain::RuntimeProfile;
use crate::domain::shell::quote;

/// What `check_target` found on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub tmpdir: String,
    /// The staging directory exists, so a deployment would abort.
    pub locked: bool,
    pub interpreter: bool,
    pub package_manager: bool,
    pub tool: bool,
}

impl TargetReport {
    /// `true` if a deployment would get past locking and provisioning
    /// without installing anything.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !self.locked && self.interpreter && self.package_manager && self.tool
    }
}

/// Inspect lock state and runtime presence. Issues only read-only commands.
///
/// # Errors
///
/// Returns an error if the session fails.
pub async fn check_target(
    session: &impl ExecutionSession,
    tmpdir: &str,
    runtime: &RuntimeProfile,
) -> Result<TargetReport> {
    let locked = session.run(&format!("test -e {}", quote(tmpdir))).await?;
    let interpreter = session.run(&runtime.interpreter_check()).await?;
    let package_manager = session.run(&runtime.package_manager_check()).await?;
    // Asking the package manager about the tool is pointless without it.
    let tool = package_manager && session.run(&runtime.tool_check()).await?;
    Ok(TargetReport {
        tmpdir: tmpdir.to_string(),
        locked,
        interpreter,
        package_manager,
        tool,
    })
}

/// Result of `unlock_target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// The staging directory existed and was removed.
    Removed,
    /// There was nothing to remove.
    NotLocked,
}

/// Remove a stale staging directory.
///
/// # Errors
///
/// Returns an error if the session fails or the directory exists but could
/// not be removed.
pub async fn unlock_target(
    session: &impl ExecutionSession,
    tmpdir: &str,
    reporter: &impl ProgressReporter,
) -> Result<UnlockOutcome> {
    if !session.run(&format!("test -e {}", quote(tmpdir))).await? {
        return Ok(UnlockOutcome::NotLocked);
    }
    anyhow::ensure!(
        remove_staging_dir(session, tmpdir, reporter).await,
        "{tmpdir} exists but could not be removed. Check its permissions on the target."
    );
    tracing::info!(tmpdir, "staging directory removed");
    Ok(UnlockOutcome::Removed)
}
