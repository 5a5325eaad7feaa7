//! `ExecutionSession` implementations for local and remote targets.
//!
//! Both variants give the coordinator the same contract: `run` maps a zero
//! exit status to `true` and anything else, including a command that could
//! not be started, to `false`.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ExecutionSession};
use crate::domain::shell::quote;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::ssh::{RemoteExec, SshConnection};

/// Largest remote write command, in bytes. Linux caps a single argument
/// string at 128 KiB; the margin covers the `sh -c` wrapper.
pub const MAX_INLINE_PAYLOAD: usize = 120 * 1024;

/// Session on the local machine. Commands run under `sh -c`.
pub struct LocalSession<R: CommandRunner> {
    runner: R,
    command_timeout: Option<Duration>,
}

impl<R: CommandRunner> LocalSession<R> {
    pub fn new(runner: R, command_timeout: Option<Duration>) -> Self {
        Self {
            runner,
            command_timeout,
        }
    }
}

impl<R: CommandRunner> ExecutionSession for LocalSession<R> {
    async fn run(&self, command: &str) -> Result<bool> {
        tracing::debug!(command, "local exec");
        let args = ["-c", command];
        let status = match self.command_timeout {
            Some(limit) => self.runner.run_status_with_timeout("sh", &args, limit).await,
            None => self.runner.run_status("sh", &args).await,
        };
        match status {
            Ok(status) => Ok(status.success()),
            Err(e) => {
                tracing::warn!(command, error = %e, "local command did not complete");
                Ok(false)
            }
        }
    }

    async fn write_file(&self, content: &str, dest_path: &str) -> Result<bool> {
        tokio::fs::write(dest_path, content)
            .await
            .with_context(|| format!("failed to write {dest_path}"))?;
        Ok(true)
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}

/// Session on a remote host. Every command runs on its own channel.
pub struct RemoteSession<E: RemoteExec> {
    exec: E,
}

impl<E: RemoteExec> RemoteSession<E> {
    pub fn new(exec: E) -> Self {
        Self { exec }
    }
}

/// Shell command that writes `content` verbatim to `dest_path`.
///
/// # Errors
///
/// Returns an error if the command would exceed `MAX_INLINE_PAYLOAD`.
pub fn inline_write_command(content: &str, dest_path: &str) -> Result<String> {
    let command = format!("printf '%s' {} > {}", quote(content), quote(dest_path));
    anyhow::ensure!(
        command.len() <= MAX_INLINE_PAYLOAD,
        "shadow script is too large to send over SSH ({} bytes, limit {MAX_INLINE_PAYLOAD})",
        command.len()
    );
    Ok(command)
}

impl<E: RemoteExec> ExecutionSession for RemoteSession<E> {
    async fn run(&self, command: &str) -> Result<bool> {
        match self.exec.exec(command).await {
            Ok(Some(0)) => Ok(true),
            Ok(status) => {
                tracing::debug!(command, ?status, "remote command failed");
                Ok(false)
            }
            Err(e) => {
                tracing::warn!(command, error = %e, "remote command did not complete");
                Ok(false)
            }
        }
    }

    async fn write_file(&self, content: &str, dest_path: &str) -> Result<bool> {
        let command = inline_write_command(content, dest_path)?;
        self.run(&command).await
    }

    async fn close(self) -> Result<()> {
        self.exec.disconnect().await
    }
}

/// The session the CLI opens: one of the two concrete kinds.
pub enum Session {
    Local(LocalSession<TokioCommandRunner>),
    Remote(RemoteSession<SshConnection>),
}

impl ExecutionSession for Session {
    async fn run(&self, command: &str) -> Result<bool> {
        match self {
            Self::Local(s) => s.run(command).await,
            Self::Remote(s) => s.run(command).await,
        }
    }

    async fn write_file(&self, content: &str, dest_path: &str) -> Result<bool> {
        match self {
            Self::Local(s) => s.write_file(content, dest_path).await,
            Self::Remote(s) => s.write_file(content, dest_path).await,
        }
    }

    async fn close(self) -> Result<()> {
        match self {
            Self::Local(s) => s.close().await,
            Self::Remote(s) => s.close().await,
        }
    }
}
