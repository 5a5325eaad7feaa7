//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod deploy;
pub mod error;
pub mod prompt;
pub mod runtime;
pub mod shell;
pub mod target;

pub use config::{ShaddoxConfig, validate_config_key, validate_config_value};
pub use deploy::{DeployOptions, DeployPhase, ShadowScript};
pub use error::{ConfigError, DeployError, TargetError};
pub use runtime::RuntimeProfile;
pub use target::{HostKeyChecking, RemoteTarget, SshAuth, Target, TargetAddress};
