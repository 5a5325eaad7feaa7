//! `shaddox unlock`: remove a staging directory left behind by an
//! interrupted deployment.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::SessionOpener as _;
use crate::application::services::deploy::with_session;
use crate::application::services::target_status::{UnlockOutcome, unlock_target};
use crate::commands::{TargetArgs, target_connector};
use crate::output::reporter::TerminalReporter;

/// Arguments for the unlock command.
#[derive(Args, Debug)]
pub struct UnlockArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Run the unlock command.
///
/// # Errors
///
/// Returns an error if the target cannot be reached or the directory
/// cannot be removed.
pub async fn run(app: &AppContext, args: &UnlockArgs) -> Result<ExitCode> {
    let config = app.load_config()?;
    let tmpdir = args.target.tmpdir(&config)?;
    let connector = target_connector(&args.target, &config)?;

    let prompt = format!(
        "Remove {tmpdir} on {}? Only do this if no deployment is running there.",
        connector.describe()
    );
    if !app.confirm(&prompt, true)? {
        app.output.info("Nothing removed.");
        return Ok(ExitCode::SUCCESS);
    }

    let reporter = TerminalReporter::new(&app.output);
    let outcome = with_session(&connector, &reporter, async |session| {
        unlock_target(session, &tmpdir, &reporter).await
    })
    .await?;

    match outcome {
        UnlockOutcome::Removed => app.output.success(&format!("Removed {tmpdir}")),
        UnlockOutcome::NotLocked => app.output.info(&format!("{tmpdir} does not exist")),
    }
    Ok(ExitCode::SUCCESS)
}
