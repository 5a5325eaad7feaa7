//! Application service: deploy use-case (the provisioning coordinator).
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All target I/O is routed through an injected `ExecutionSession`.
//!
//! Phases: `Start → Locking → Provisioning → Staging → Executing → Cleanup →
//! Done`, with `Aborted` reachable from every non-terminal phase. The
//! staging directory is the lock; once `mkdir` has succeeded it is removed
//! on every exit path unless `keep_tmp_dir` is set.

use std::cell::Cell;

use anyhow::{Context, Result};

use crate::application::ports::{ExecutionSession, ProgressReporter, SessionOpener};
use crate::domain::shell::quote;
use crate::domain::{DeployError, DeployOptions, DeployPhase, RuntimeProfile, ShadowScript};

/// Everything one deployment needs besides the target.
#[derive(Clone, Copy)]
pub struct DeployRequest<'a> {
    pub script: &'a ShadowScript,
    pub options: &'a DeployOptions,
    pub runtime: &'a RuntimeProfile,
}

/// Result of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    /// Where the shadow script was staged.
    pub script_path: String,
    /// `true` when the staging directory was left on the target.
    pub staging_dir_kept: bool,
}

/// Open a session on `opener`, run `f` with it, and close the session on
/// every exit path.
///
/// A failure to close is logged and reported as a warning; it never masks
/// the result of `f`.
///
/// # Errors
///
/// Returns the error from opening the session or from `f`.
pub async fn with_session<O, T, F>(opener: &O, reporter: &impl ProgressReporter, f: F) -> Result<T>
where
    O: SessionOpener,
    F: AsyncFnOnce(&O::Session) -> Result<T>,
{
    let target = opener.describe();
    reporter.step(&format!("Connecting to {target}"));
    let session = opener
        .open()
        .await
        .with_context(|| format!("opening session on {target}"))?;
    tracing::debug!(%target, "session opened");

    let result = f(&session).await;

    if let Err(e) = session.close().await {
        tracing::warn!(%target, error = %e, "failed to close session");
        reporter.warn(&format!("Could not cleanly close the session on {target}: {e:#}"));
    }
    result
}

/// Deploy `request.script` to the target behind `opener`.
///
/// # Errors
///
/// Returns `TargetError` if the session cannot be opened, or the
/// `DeployError` that aborted the deployment.
pub async fn deploy(
    opener: &impl SessionOpener,
    request: &DeployRequest<'_>,
    reporter: &impl ProgressReporter,
) -> Result<DeployOutcome> {
    let opened = Cell::new(false);
    let result = with_session(opener, reporter, async |session| {
        opened.set(true);
        deploy_with_session(session, request, reporter).await
    })
    .await;
    if result.is_err() && !opened.get() {
        enter(reporter, DeployPhase::Aborted);
    }
    result
}

/// Run the full provisioning sequence on an already-open session.
///
/// # Errors
///
/// - `DeployError::AlreadyRunning` if the staging directory exists.
/// - `DeployError::MissingDependency` if the runtime or tool is absent.
/// - `DeployError::StagingFailed` / `ExecutionFailed` for payload failures.
/// - Any session error, after cleanup has run.
pub async fn deploy_with_session(
    session: &impl ExecutionSession,
    request: &DeployRequest<'_>,
    reporter: &impl ProgressReporter,
) -> Result<DeployOutcome> {
    let DeployRequest {
        script,
        options,
        runtime,
    } = *request;
    let tmpdir = options.tmpdir.as_str();

    enter(reporter, DeployPhase::Start);
    if options.force && !remove_staging_dir(session, tmpdir, reporter).await {
        reporter.warn(&format!("Could not remove {tmpdir}. Trying to continue anyway."));
    }

    enter(reporter, DeployPhase::Locking);
    reporter.step(&format!("Creating {tmpdir}"));
    let locked = match session.run(&format!("mkdir {}", quote(tmpdir))).await {
        Ok(locked) => locked,
        Err(e) => return Err(abort(reporter, e.context("creating staging directory"))),
    };
    if !locked {
        return Err(abort(
            reporter,
            DeployError::AlreadyRunning {
                tmpdir: tmpdir.to_string(),
            }
            .into(),
        ));
    }

    // The lock is ours from here on; every path goes through Cleanup.
    let result = provision_stage_execute(session, script, options, runtime, reporter).await;

    enter(reporter, DeployPhase::Cleanup);
    if options.keep_tmp_dir {
        tracing::info!(tmpdir, "keeping staging directory");
    } else if !remove_staging_dir(session, tmpdir, reporter).await {
        reporter.warn(&format!(
            "Could not remove {tmpdir}. Remove it manually or run 'shaddox unlock' \
             before the next deployment."
        ));
    }

    match result {
        Ok(script_path) => {
            enter(reporter, DeployPhase::Done);
            reporter.success("Shadow script executed successfully");
            Ok(DeployOutcome {
                script_path,
                staging_dir_kept: options.keep_tmp_dir,
            })
        }
        Err(e) => Err(abort(reporter, e)),
    }
}

async fn provision_stage_execute(
    session: &impl ExecutionSession,
    script: &ShadowScript,
    options: &DeployOptions,
    runtime: &RuntimeProfile,
    reporter: &impl ProgressReporter,
) -> Result<String> {
    enter(reporter, DeployPhase::Provisioning);
    ensure_runtime(session, runtime, reporter).await?;

    enter(reporter, DeployPhase::Staging);
    let script_path = options.script_path(&runtime.script_extension);
    reporter.step("Writing shadow script");
    let written = session
        .write_file(&script.content, &script_path)
        .await
        .with_context(|| format!("writing shadow script to {script_path}"))?;
    if !written {
        return Err(DeployError::StagingFailed { path: script_path }.into());
    }

    enter(reporter, DeployPhase::Executing);
    reporter.step("Executing shadow script");
    let executed = session
        .run(&runtime.run_script(&script_path))
        .await
        .context("executing shadow script")?;
    if !executed {
        return Err(DeployError::ExecutionFailed { path: script_path }.into());
    }
    Ok(script_path)
}

/// Make sure the interpreter, its package manager, and the tool are present.
///
/// A missing interpreter or package manager is fatal: installing a language
/// runtime is left to the operator. A missing tool is installed; an
/// installed tool is updated, and a failed update only warns.
///
/// # Errors
///
/// Returns `DeployError::MissingDependency` or a session error.
pub async fn ensure_runtime(
    session: &impl ExecutionSession,
    runtime: &RuntimeProfile,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    if !session.run(&runtime.interpreter_check()).await? {
        return Err(DeployError::MissingDependency {
            dependency: runtime.interpreter_display(),
            remediation: "Please install it manually.".to_string(),
        }
        .into());
    }
    if !session.run(&runtime.package_manager_check()).await? {
        return Err(DeployError::MissingDependency {
            dependency: runtime.package_manager_display(),
            remediation: "Please install it manually.".to_string(),
        }
        .into());
    }

    let tool = &runtime.tool;
    if session.run(&runtime.tool_check()).await? {
        reporter.step(&format!("Updating {tool}..."));
        if !session.run(&runtime.tool_update()).await? {
            reporter.warn(&format!(
                "{tool} could not be automatically updated. Please update it manually with '{}'.",
                runtime.tool_update()
            ));
        }
    } else {
        reporter.step(&format!("Installing {tool}..."));
        if !session.run(&runtime.tool_install()).await? {
            tracing::warn!(tool = %tool, "install command failed");
        }
    }

    if !session.run(&runtime.tool_check()).await? {
        return Err(DeployError::MissingDependency {
            dependency: tool.clone(),
            remediation: format!(
                "It could not be installed automatically. Please install it manually with '{}'.",
                runtime.tool_install()
            ),
        }
        .into());
    }
    Ok(())
}

/// Remove `tmpdir` if it exists. Returns `false` if it exists and could not
/// be removed.
pub async fn remove_staging_dir(
    session: &impl ExecutionSession,
    tmpdir: &str,
    reporter: &impl ProgressReporter,
) -> bool {
    let quoted = quote(tmpdir);
    match session.run(&format!("test -e {quoted}")).await {
        Ok(false) => return true,
        Ok(true) => {}
        Err(e) => {
            tracing::warn!(tmpdir, error = %e, "cannot check staging directory");
            return false;
        }
    }
    reporter.step(&format!("Removing {tmpdir}"));
    match session.run(&format!("rm -r {quoted}")).await {
        Ok(removed) => removed,
        Err(e) => {
            tracing::warn!(tmpdir, error = %e, "cannot remove staging directory");
            false
        }
    }
}

fn enter(reporter: &impl ProgressReporter, phase: DeployPhase) {
    tracing::info!(%phase, "deploy phase");
    reporter.phase(phase);
}

fn abort(reporter: &impl ProgressReporter, e: anyhow::Error) -> anyhow::Error {
    enter(reporter, DeployPhase::Aborted);
    e
}
