//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use anyhow::Result;

use crate::domain::{DeployPhase, ShaddoxConfig};

// ── Execution Session Port ────────────────────────────────────────────────────

/// Live capability handle for one target during one deployment.
///
/// Implementations issue commands one at a time, in call order. `run`
/// returns `Ok(false)` when the command ran but did not succeed; `Err` is
/// reserved for failures of the session itself.
#[allow(async_fn_in_trait)]
pub trait ExecutionSession {
    /// Run a shell command on the target. `true` means exit status 0.
    async fn run(&self, command: &str) -> Result<bool>;

    /// Create or truncate `dest_path` on the target and write `content` to it.
    async fn write_file(&self, content: &str, dest_path: &str) -> Result<bool>;

    /// Release the session and any underlying connection.
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Something that can open an [`ExecutionSession`] scoped to one deployment.
#[allow(async_fn_in_trait)]
pub trait SessionOpener {
    type Session: ExecutionSession;

    /// Open a session. Remote targets connect and authenticate here.
    ///
    /// # Errors
    ///
    /// Returns a `TargetError` (wrapped in `anyhow`) if the target cannot be
    /// reached or rejects the credentials.
    async fn open(&self) -> Result<Self::Session>;

    /// Human-readable description of the target for progress output.
    fn describe(&self) -> String;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts local process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program with inherited stdio and return its exit status.
    /// No timeout.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus>;

    /// Like [`run_status`](Self::run_status) but kills the child after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_status_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<ExitStatus>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// The coordinator entered `phase`.
    fn phase(&self, phase: DeployPhase);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load the configuration, returning defaults when no file exists.
    fn load(&self) -> Result<ShaddoxConfig>;
    /// Persist the configuration.
    fn save(&self, config: &ShaddoxConfig) -> Result<()>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}
