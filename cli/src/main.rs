//! shaddox - push a shadow script to a machine, run it once, clean up

use std::process::ExitCode;

use clap::Parser;

use shaddox_cli::cli::Cli;
use shaddox_cli::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init_logging(cli.verbose) {
        eprintln!("Warning: {e}");
    }
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
