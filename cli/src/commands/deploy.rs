//! `shaddox deploy`: push a shadow script, run it once, clean up.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::services::deploy::{DeployRequest, deploy};
use crate::commands::{TargetArgs, target_connector};
use crate::domain::{DeployOptions, ShadowScript};
use crate::output::reporter::TerminalReporter;

/// Arguments for the deploy command.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Script to stage and run on the target
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Remove an existing staging directory before locking
    #[arg(short, long)]
    pub force: bool,

    /// Leave the staging directory on the target afterwards
    #[arg(long)]
    pub keep_tmp_dir: bool,
}

/// Run the deploy command.
///
/// # Errors
///
/// Returns an error if the script cannot be read, the target cannot be
/// reached, or the deployment aborts.
pub async fn run(app: &AppContext, args: &DeployArgs) -> Result<ExitCode> {
    let config = app.load_config()?;
    let content = tokio::fs::read_to_string(&args.script)
        .await
        .with_context(|| format!("cannot read script {}", args.script.display()))?;
    let script = ShadowScript::new(content);

    let options = DeployOptions {
        tmpdir: args.target.tmpdir(&config)?,
        force: args.force,
        keep_tmp_dir: args.keep_tmp_dir || config.deploy.keep_tmp_dir,
    };
    let connector = target_connector(&args.target, &config)?;
    let reporter = TerminalReporter::new(&app.output);

    let request = DeployRequest {
        script: &script,
        options: &options,
        runtime: &config.runtime,
    };
    let outcome = deploy(&connector, &request, &reporter).await?;

    if outcome.staging_dir_kept {
        app.output
            .info(&format!("Staging directory kept: {}", options.tmpdir));
    }
    Ok(ExitCode::SUCCESS)
}
