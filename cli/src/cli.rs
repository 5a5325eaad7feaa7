//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Push a shadow script to a machine, run it once, and clean up
#[derive(Parser)]
#[command(
    name = "shaddox",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Configuration file [default: ~/.shaddox/config.yaml]
    #[arg(long, global = true, env = "SHADDOX_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Stage a script on the target, provision the runtime, run it, clean up
    Deploy(commands::deploy::DeployArgs),

    /// Report lock state and runtime presence without changing anything
    Check(commands::check::CheckArgs),

    /// Remove a staging directory left behind by an interrupted deployment
    Unlock(commands::unlock::UnlockArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            quiet,
            no_color,
            verbose: _,
            yes,
            config,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            no_color,
            quiet,
            yes,
            config,
        });
        match command {
            Command::Deploy(args) => commands::deploy::run(&app, &args).await,
            Command::Check(args) => commands::check::run(&app, &args).await,
            Command::Unlock(args) => commands::unlock::run(&app, &args).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
        }
    }
}
