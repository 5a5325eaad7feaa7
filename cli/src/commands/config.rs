//! `shaddox config`: inspect and change `~/.shaddox/config.yaml`.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::config_service;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print every setting with its current value
    Show,
    /// Change one setting and save the file
    Set {
        /// Setting name, e.g. deploy.tmpdir or ssh.host_key_checking
        key: String,
        /// New value, validated before anything is written
        value: String,
    },
    /// Print the path of the file in use
    Path,
}

/// Run a config subcommand.
///
/// # Errors
///
/// Returns an error for an unreadable or unwritable file, or an unknown
/// key or invalid value on `set`.
pub fn run(app: &AppContext, cmd: ConfigCommand) -> Result<ExitCode> {
    let path = app.config_store.path()?;
    match cmd {
        ConfigCommand::Show => app.renderer().render_config(&app.load_config()?, &path),
        ConfigCommand::Set { key, value } => {
            config_service::set_config_value(&app.config_store, &key, &value)?;
            tracing::info!(%key, path = %path.display(), "setting saved");
            app.output.success(&format!("Set {key} = {value}"));
        }
        ConfigCommand::Path => println!("{}", path.display()),
    }
    Ok(ExitCode::SUCCESS)
}
