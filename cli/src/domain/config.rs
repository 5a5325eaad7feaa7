//! Domain types and validators for shaddox configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::deploy::DEFAULT_TMPDIR;
use crate::domain::error::ConfigError;
use crate::domain::prompt::{DEFAULT_SUDO_PROMPT, RegexPromptMatcher};
use crate::domain::runtime::RuntimeProfile;
use crate::domain::target::{DEFAULT_SSH_PORT, HostKeyChecking};

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "deploy.tmpdir",
    "deploy.keep_tmp_dir",
    "deploy.command_timeout_secs",
    "runtime.interpreter",
    "runtime.package_manager",
    "runtime.tool",
    "runtime.script_extension",
    "ssh.port",
    "ssh.sudo_prompt",
    "ssh.host_key_checking",
];

/// Names interpolated unquoted into capability-check commands.
static PLAIN_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._+-]*$").expect("valid regex")
});

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.shaddox/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ShaddoxConfig {
    pub deploy: DeployConfig,
    pub runtime: RuntimeProfile,
    pub ssh: SshConfig,
}

/// Defaults for `shaddox deploy`. CLI flags override these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub tmpdir: String,
    pub keep_tmp_dir: bool,
    /// Upper bound on a single target command. Unset means wait forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_timeout_secs: Option<u64>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            tmpdir: DEFAULT_TMPDIR.to_string(),
            keep_tmp_dir: false,
            command_timeout_secs: None,
        }
    }
}

/// Remote session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    pub port: u16,
    /// Regex matched against streamed output to detect a sudo password prompt.
    pub sudo_prompt: String,
    pub host_key_checking: HostKeyChecking,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SSH_PORT,
            sudo_prompt: DEFAULT_SUDO_PROMPT.to_string(),
            host_key_checking: HostKeyChecking::default(),
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a staging directory path.
///
/// The directory is removed recursively at the end of every deployment, so
/// it must be absolute, at least two levels deep (so `/`, `/tmp` and
/// `/home` are refused), and must not contain `..`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` describing the first violation.
pub fn validate_tmpdir(tmpdir: &str) -> Result<()> {
    let reason = if !tmpdir.starts_with('/') {
        Some("The staging directory must be an absolute path.")
    } else if tmpdir.split('/').any(|c| c == "..") {
        Some("The staging directory cannot contain '..' components.")
    } else if tmpdir
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .count()
        < 2
    {
        Some("The staging directory must be at least two levels deep, e.g. /tmp/shaddox.")
    } else if tmpdir.contains(['\n', '\0']) {
        Some("The staging directory cannot contain newlines or NUL bytes.")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ConfigError::InvalidValue {
            key: "deploy.tmpdir".to_string(),
            value: tmpdir.to_string(),
            reason: reason.to_string(),
        }
        .into()),
        None => Ok(()),
    }
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |reason: &str| -> anyhow::Error {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
        .into()
    };
    match key {
        "deploy.tmpdir" => validate_tmpdir(value),
        "deploy.keep_tmp_dir" => value
            .parse::<bool>()
            .map(|_| ())
            .map_err(|_| invalid("Valid values: true, false")),
        "runtime.interpreter"
        | "runtime.package_manager"
        | "runtime.tool"
        | "runtime.script_extension" => {
            if PLAIN_NAME_RE.is_match(value) {
                Ok(())
            } else {
                Err(invalid(
                    "Must be a plain name: letters, digits, '.', '_', '+' or '-'.",
                ))
            }
        }
        "ssh.port" => match value.parse::<u16>() {
            Ok(p) if p > 0 => Ok(()),
            _ => Err(invalid("Must be a port number between 1 and 65535.")),
        },
        "ssh.sudo_prompt" => RegexPromptMatcher::new(value)
            .map(|_| ())
            .map_err(|e| invalid(&format!("{e:#}"))),
        "deploy.command_timeout_secs" => match value.parse::<u64>() {
            Ok(s) if s > 0 => Ok(()),
            _ => Err(invalid("Must be a positive number of seconds.")),
        },
        "ssh.host_key_checking" => value
            .parse::<HostKeyChecking>()
            .map(|_| ())
            .map_err(|_| {
                invalid(&format!(
                    "Valid values: {}",
                    HostKeyChecking::VARIANTS.join(", ")
                ))
            }),
        _ => validate_config_key(key),
    }
}

/// Applies a validated `key = value` to `config`.
///
/// # Errors
///
/// Returns an error if the key is unknown or the value is invalid.
pub fn apply_config_value(config: &mut ShaddoxConfig, key: &str, value: &str) -> Result<()> {
    validate_config_key(key)?;
    validate_config_value(key, value)?;
    match key {
        "deploy.tmpdir" => config.deploy.tmpdir = value.to_string(),
        "deploy.keep_tmp_dir" => config.deploy.keep_tmp_dir = value.parse()?,
        "runtime.interpreter" => config.runtime.interpreter = value.to_string(),
        "runtime.package_manager" => config.runtime.package_manager = value.to_string(),
        "runtime.tool" => config.runtime.tool = value.to_string(),
        "runtime.script_extension" => config.runtime.script_extension = value.to_string(),
        "ssh.port" => config.ssh.port = value.parse()?,
        "ssh.sudo_prompt" => config.ssh.sudo_prompt = value.to_string(),
        "ssh.host_key_checking" => {
            config.ssh.host_key_checking = value.parse().map_err(anyhow::Error::msg)?;
        }
        "deploy.command_timeout_secs" => {
            config.deploy.command_timeout_secs = Some(value.parse()?);
        }
        _ => anyhow::bail!("Unknown setting: {key}"),
    }
    Ok(())
}

/// Validates a whole configuration loaded from disk.
///
/// # Errors
///
/// Returns the first invalid field.
pub fn validate_config(config: &ShaddoxConfig) -> Result<()> {
    validate_tmpdir(&config.deploy.tmpdir)?;
    validate_config_value("runtime.interpreter", &config.runtime.interpreter)?;
    validate_config_value("runtime.package_manager", &config.runtime.package_manager)?;
    validate_config_value("runtime.tool", &config.runtime.tool)?;
    validate_config_value("runtime.script_extension", &config.runtime.script_extension)?;
    validate_config_value("ssh.port", &config.ssh.port.to_string())?;
    validate_config_value("ssh.sudo_prompt", &config.ssh.sudo_prompt)?;
    if let Some(secs) = config.deploy.command_timeout_secs {
        validate_config_value("deploy.command_timeout_secs", &secs.to_string())?;
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
