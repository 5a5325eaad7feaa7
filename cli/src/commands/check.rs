//! `shaddox check`: read-only inspection of a target.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::SessionOpener as _;
use crate::application::services::deploy::with_session;
use crate::application::services::target_status::check_target;
use crate::commands::{TargetArgs, target_connector};
use crate::output::reporter::TerminalReporter;

/// Arguments for the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Run the check command. Exits non-zero when a deployment would not run
/// cleanly.
///
/// # Errors
///
/// Returns an error if the target cannot be reached.
pub async fn run(app: &AppContext, args: &CheckArgs) -> Result<ExitCode> {
    let config = app.load_config()?;
    let tmpdir = args.target.tmpdir(&config)?;
    let connector = target_connector(&args.target, &config)?;
    let reporter = TerminalReporter::new(&app.output);

    let report = with_session(&connector, &reporter, async |session| {
        check_target(session, &tmpdir, &config.runtime).await
    })
    .await?;

    app.renderer()
        .render_check(&connector.describe(), &report, &config.runtime);
    Ok(if report.is_ready() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
