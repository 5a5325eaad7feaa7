//! Deployment targets: the local machine or a remote host over SSH.
//!
//! Pure data and parsing. Opening sessions lives in `crate::infra::target`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::TargetError;

/// Default SSH port.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// A machine a shadow script can be deployed to. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Local,
    Remote(RemoteTarget),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("localhost"),
            Self::Remote(r) => write!(f, "{}@{}:{}", r.user, r.host, r.port),
        }
    }
}

/// Connection parameters for a remote target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub auth: SshAuth,
}

/// Credential bundle handed to the SSH client.
#[derive(Clone, PartialEq, Eq)]
pub enum SshAuth {
    /// Private key file, optionally encrypted.
    Key {
        path: PathBuf,
        passphrase: Option<String>,
    },
    Password(String),
}

impl fmt::Debug for SshAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key { path, passphrase } => f
                .debug_struct("Key")
                .field("path", path)
                .field("passphrase", &passphrase.as_ref().map(|_| "<redacted>"))
                .finish(),
            Self::Password(_) => f.write_str("Password(<redacted>)"),
        }
    }
}

/// How the SSH client treats the server's host key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyChecking {
    /// Only hosts already in `~/.ssh/known_hosts` are accepted.
    Strict,
    /// Unknown hosts are learned; changed keys are rejected.
    #[default]
    AcceptNew,
    /// Any key is accepted.
    Off,
}

impl HostKeyChecking {
    pub const VARIANTS: &[&str] = &["strict", "accept-new", "off"];
}

impl fmt::Display for HostKeyChecking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strict => "strict",
            Self::AcceptNew => "accept-new",
            Self::Off => "off",
        })
    }
}

impl FromStr for HostKeyChecking {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "accept-new" => Ok(Self::AcceptNew),
            "off" => Ok(Self::Off),
            other => Err(format!("unknown host key checking mode '{other}'")),
        }
    }
}

/// A parsed `[user@]host[:port]` address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetAddress {
    pub user: Option<String>,
    pub host: String,
    pub port: Option<u16>,
}

impl TargetAddress {
    /// Parse `[user@]host[:port]`. IPv6 hosts must be bracketed: `[::1]:2222`.
    ///
    /// # Errors
    ///
    /// Returns `TargetError::InvalidAddress` for an empty host or user, or a
    /// port that is not a non-zero `u16`.
    pub fn parse(input: &str) -> Result<Self, TargetError> {
        let invalid = || TargetError::InvalidAddress(input.to_string());

        let (user, rest) = match input.rsplit_once('@') {
            Some((u, rest)) if !u.is_empty() => (Some(u.to_string()), rest),
            Some(_) => return Err(invalid()),
            None => (None, input),
        };

        let (host, port) = if let Some(bracketed) = rest.strip_prefix('[') {
            let (host, after) = bracketed.split_once(']').ok_or_else(invalid)?;
            match after {
                "" => (host, None),
                p => (host, Some(p.strip_prefix(':').ok_or_else(invalid)?)),
            }
        } else {
            match rest.split_once(':') {
                Some((h, p)) => (h, Some(p)),
                None => (rest, None),
            }
        };

        if host.is_empty() || host.contains(char::is_whitespace) {
            return Err(invalid());
        }
        let port = match port {
            Some(p) => match p.parse::<u16>() {
                Ok(0) | Err(_) => return Err(invalid()),
                Ok(n) => Some(n),
            },
            None => None,
        };

        Ok(Self {
            user,
            host: host.to_string(),
            port,
        })
    }
}
