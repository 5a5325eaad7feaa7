//! Command implementations

pub mod check;
pub mod config;
pub mod deploy;
pub mod unlock;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use crate::domain::config::{ShaddoxConfig, validate_tmpdir};
use crate::domain::prompt::RegexPromptMatcher;
use crate::domain::{RemoteTarget, SshAuth, Target, TargetAddress};
use crate::infra::target::TargetConnector;

/// Private keys tried, in order, when no `--identity` is given.
pub const DEFAULT_IDENTITIES: &[&str] = &["id_ed25519", "id_ecdsa", "id_rsa"];

/// Flags selecting and authenticating against the target.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Remote host as [user@]host[:port]; omit to target this machine
    #[arg(long, value_name = "ADDRESS")]
    pub host: Option<String>,

    /// Remote user when the address has none [default: $USER]
    #[arg(long, requires = "host")]
    pub user: Option<String>,

    /// Private key file [default: ~/.ssh/id_ed25519, id_ecdsa, id_rsa]
    #[arg(short, long, value_name = "PATH", requires = "host")]
    pub identity: Option<PathBuf>,

    /// Environment variable holding the private key passphrase
    #[arg(long, value_name = "VAR", requires = "host")]
    pub passphrase_env: Option<String>,

    /// Environment variable holding the SSH password
    #[arg(long, value_name = "VAR", requires = "host", conflicts_with = "identity")]
    pub password_env: Option<String>,

    /// Staging directory on the target [default: deploy.tmpdir]
    #[arg(long, value_name = "DIR")]
    pub tmpdir: Option<String>,
}

impl TargetArgs {
    /// Staging directory from the flag or the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is not a safe absolute path.
    pub fn tmpdir(&self, config: &ShaddoxConfig) -> Result<String> {
        let tmpdir = self
            .tmpdir
            .clone()
            .unwrap_or_else(|| config.deploy.tmpdir.clone());
        validate_tmpdir(&tmpdir)?;
        Ok(tmpdir)
    }
}

/// Build the `Target` described by `args`.
///
/// `env` looks up environment variables and `home` is the user's home
/// directory; both are injected so resolution can be tested.
///
/// # Errors
///
/// Returns an error for a malformed address, a missing user, an unset
/// credential variable, or when no private key can be found.
pub fn resolve_target(
    args: &TargetArgs,
    config: &ShaddoxConfig,
    env: impl Fn(&str) -> Option<String>,
    home: Option<&Path>,
) -> Result<Target> {
    let Some(address) = &args.host else {
        return Ok(Target::Local);
    };
    let address = TargetAddress::parse(address)?;

    let user = address
        .user
        .or_else(|| args.user.clone())
        .or_else(|| env("USER"))
        .or_else(|| env("USERNAME"))
        .context("No remote user: use user@host or --user")?;
    let port = address.port.unwrap_or(config.ssh.port);

    let read_var = |var: &str| {
        env(var).with_context(|| format!("environment variable {var} is not set"))
    };
    let auth = if let Some(var) = &args.password_env {
        SshAuth::Password(read_var(var)?)
    } else {
        let passphrase = args.passphrase_env.as_deref().map(read_var).transpose()?;
        let path = match &args.identity {
            Some(path) => path.clone(),
            None => default_identity(home).context(
                "No private key found in ~/.ssh. Pass --identity or --password-env.",
            )?,
        };
        SshAuth::Key { path, passphrase }
    };

    Ok(Target::Remote(RemoteTarget {
        host: address.host,
        port,
        user,
        auth,
    }))
}

/// First of `DEFAULT_IDENTITIES` that exists under `home/.ssh`.
#[must_use]
pub fn default_identity(home: Option<&Path>) -> Option<PathBuf> {
    let ssh_dir = home?.join(".ssh");
    DEFAULT_IDENTITIES
        .iter()
        .map(|name| ssh_dir.join(name))
        .find(|path| path.is_file())
}

/// Session opener for `target` using the configured SSH and timeout settings.
///
/// # Errors
///
/// Returns an error if `ssh.sudo_prompt` is not a valid regex.
pub fn connector(target: Target, config: &ShaddoxConfig) -> Result<TargetConnector> {
    let prompt = RegexPromptMatcher::new(&config.ssh.sudo_prompt)?;
    Ok(TargetConnector::new(
        target,
        config.deploy.command_timeout_secs.map(Duration::from_secs),
        config.ssh.host_key_checking,
        Arc::new(prompt),
    ))
}

/// Resolve the target from the process environment and open a connector.
///
/// # Errors
///
/// See [`resolve_target`] and [`connector`].
pub fn target_connector(args: &TargetArgs, config: &ShaddoxConfig) -> Result<TargetConnector> {
    let home = dirs::home_dir();
    let target = resolve_target(
        args,
        config,
        |var| std::env::var(var).ok(),
        home.as_deref(),
    )?;
    tracing::debug!(?target, "resolved target");
    connector(target, config)
}
