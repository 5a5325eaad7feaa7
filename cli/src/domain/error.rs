//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Deployment errors ─────────────────────────────────────────────────────────

/// Fatal outcomes of a single deployment.
///
/// Every variant carries the remediation in its message. The coordinator
/// returns these wrapped in `anyhow::Error`; callers classify with
/// `err.downcast_ref::<DeployError>()`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeployError {
    #[error(
        "Shaddox is already running on this machine ({tmpdir} exists). \
         Try again later. If a previous deployment left it behind, re-run with --force \
         or run 'shaddox unlock'."
    )]
    AlreadyRunning { tmpdir: String },

    #[error("{dependency} is required on the target. {remediation}")]
    MissingDependency {
        dependency: String,
        remediation: String,
    },

    #[error("Shadow script could not be written to {path}.")]
    StagingFailed { path: String },

    #[error("Shadow script was not executed successfully ({path}). See the output above.")]
    ExecutionFailed { path: String },
}

// ── Target errors ─────────────────────────────────────────────────────────────

/// Failures opening an execution session on a target.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("Cannot connect to {host}:{port}: {reason}")]
    Connect {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("Authentication rejected for {user}@{host}. Check --identity or --password-env.")]
    AuthenticationRejected { user: String, host: String },

    #[error(
        "Host key for {host}:{port} was rejected: {reason}. \
         Check ~/.ssh/known_hosts or adjust ssh.host_key_checking."
    )]
    HostKeyRejected {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("Cannot load private key {path}: {reason}")]
    KeyLoad { path: String, reason: String },

    #[error("Invalid target '{0}': expected [user@]host[:port]")]
    InvalidAddress(String),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
