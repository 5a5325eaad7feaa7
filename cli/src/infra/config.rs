//! YAML-file implementation of the `ConfigStore` port.

use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::ShaddoxConfig;

/// `ConfigStore` backed by a YAML file, `~/.shaddox/config.yaml` unless an
/// explicit path is given (`--config` / `SHADDOX_CONFIG`).
#[derive(Debug, Clone, Default)]
pub struct YamlConfigStore {
    explicit: Option<PathBuf>,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }

    /// Store reading and writing exactly `path`.
    #[must_use]
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self::new(Some(path.as_ref().to_path_buf()))
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<ShaddoxConfig> {
        let path = self.path()?;
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(ShaddoxConfig::default());
            }
            Err(e) => return Err(e).with_context(|| format!("cannot read {}", path.display())),
        };
        if content.trim().is_empty() {
            return Ok(ShaddoxConfig::default());
        }
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    /// Writes a temp file next to the target and renames it into place.
    /// `NamedTempFile` is created with mode 0600 and the rename keeps it.
    fn save(&self, config: &ShaddoxConfig) -> Result<()> {
        let path = self.path()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;

        let yaml = serde_yaml::to_string(config).context("cannot serialize config")?;
        let mut staged = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("cannot create a temp file in {}", dir.display()))?;
        staged
            .write_all(yaml.as_bytes())
            .with_context(|| format!("cannot write {}", staged.path().display()))?;
        staged
            .persist(&path)
            .with_context(|| format!("cannot write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }

    fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.explicit {
            return Ok(path.clone());
        }
        let home = dirs::home_dir().context("cannot determine home directory")?;
        Ok(home.join(".shaddox").join("config.yaml"))
    }
}
