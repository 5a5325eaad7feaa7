//! Deployment value types: options, payload, and coordinator phases.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::fmt;

/// Default staging directory on the target.
pub const DEFAULT_TMPDIR: &str = "/tmp/shaddox";

/// File stem of the staged script inside the staging directory.
pub const SHADOW_SCRIPT_STEM: &str = "shadow_script";

/// Per-invocation deployment options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// Staging directory on the target. Doubles as the deployment lock.
    pub tmpdir: String,
    /// Remove a pre-existing staging directory before locking.
    pub force: bool,
    /// Leave the staging directory in place when the deployment ends.
    pub keep_tmp_dir: bool,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            tmpdir: DEFAULT_TMPDIR.to_string(),
            force: false,
            keep_tmp_dir: false,
        }
    }
}

impl DeployOptions {
    /// Path the shadow script is staged at: `{tmpdir}/shadow_script.<ext>`.
    #[must_use]
    pub fn script_path(&self, extension: &str) -> String {
        let dir = self.tmpdir.trim_end_matches('/');
        format!("{dir}/{SHADOW_SCRIPT_STEM}.{extension}")
    }
}

/// The user-supplied payload. Opaque to shaddox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowScript {
    pub content: String,
}

impl ShadowScript {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Phases the provisioning coordinator moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployPhase {
    Start,
    Locking,
    Provisioning,
    Staging,
    Executing,
    Cleanup,
    Done,
    Aborted,
}

impl fmt::Display for DeployPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Locking => "locking",
            Self::Provisioning => "provisioning",
            Self::Staging => "staging",
            Self::Executing => "executing",
            Self::Cleanup => "cleanup",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}
