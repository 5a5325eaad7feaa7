//! State shared by every command handler.
//!
//! Built once in `Cli::run()` from the global flags.

use std::path::PathBuf;

use anyhow::Result;

use crate::application::services::config_service;
use crate::domain::ShaddoxConfig;
use crate::infra::config::YamlConfigStore;
use crate::output::OutputContext;
use crate::output::human::HumanRenderer;

/// Global flags that shape the context.
pub struct AppFlags {
    pub no_color: bool,
    pub quiet: bool,
    /// `--yes`: answer every confirmation with its default.
    pub yes: bool,
    /// `--config` or `SHADDOX_CONFIG`.
    pub config: Option<PathBuf>,
}

/// Output, configuration and prompting for one invocation.
pub struct AppContext {
    pub output: OutputContext,
    pub config_store: YamlConfigStore,
    /// No prompts. Set by `--yes`, or when `CI` or `SHADDOX_YES` is present.
    pub non_interactive: bool,
}

impl AppContext {
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let unattended = ["CI", "SHADDOX_YES"]
            .iter()
            .any(|var| std::env::var_os(var).is_some());
        Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            config_store: YamlConfigStore::new(flags.config.clone()),
            non_interactive: flags.yes || unattended,
        }
    }

    /// Load and validate the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds an invalid value.
    pub fn load_config(&self) -> Result<ShaddoxConfig> {
        config_service::load_config(&self.config_store)
    }

    #[must_use]
    pub fn renderer(&self) -> HumanRenderer<'_> {
        HumanRenderer::new(&self.output)
    }

    /// Ask a yes/no question, or take `default` when running unattended.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no terminal to ask on.
    pub fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            tracing::debug!(question, default, "unattended, using default answer");
            return Ok(default);
        }
        Ok(dialoguer::Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact()?)
    }
}
