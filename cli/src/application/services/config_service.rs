//! Application service: configuration use-cases.

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::{ShaddoxConfig, apply_config_value, validate_config};

/// Load and validate configuration.
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds an invalid value.
pub fn load_config(store: &impl ConfigStore) -> Result<ShaddoxConfig> {
    let config = store.load()?;
    let path = store.path()?;
    validate_config(&config)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    Ok(config)
}

/// Validate `key = value`, apply it, and persist the result.
///
/// # Errors
///
/// Returns an error if the key or value is invalid or the file cannot be written.
pub fn set_config_value(
    store: &impl ConfigStore,
    key: &str,
    value: &str,
) -> Result<ShaddoxConfig> {
    let mut config = load_config(store)?;
    apply_config_value(&mut config, key, value)?;
    store.save(&config)?;
    Ok(config)
}
