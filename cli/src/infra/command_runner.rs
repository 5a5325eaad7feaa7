//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` runs local processes with inherited stdio, so the
//! child's output streams straight to the user's terminal, and enforces an
//! optional timeout by killing the child.

use std::process::ExitStatus;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::process::Child;

use crate::application::ports::CommandRunner;

/// `CommandRunner` backed by `tokio::process`.
///
/// Dropping a `wait()` future leaves the process running, so a timeout
/// kills the child explicitly before returning.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn spawn(program: &str, args: &[&str]) -> Result<Child> {
    tokio::process::Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to spawn {program}"))
}

impl CommandRunner for TokioCommandRunner {
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus> {
        spawn(program, args)?
            .wait()
            .await
            .with_context(|| format!("waiting for {program}"))
    }

    async fn run_status_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<ExitStatus> {
        let mut child = spawn(program, args)?;
        if let Ok(status) = tokio::time::timeout(timeout, child.wait()).await {
            return status.with_context(|| format!("waiting for {program}"));
        }
        if let Err(e) = child.kill().await {
            tracing::warn!(program, error = %e, "could not kill timed-out child");
        }
        anyhow::bail!("{program} timed out after {}s", timeout.as_secs())
    }
}
