//! rdeploy CLI - single-host deployment orchestrator
//!
//! Usage: rdeploy <COMMAND>
//!
//! Commands:
//!   deploy  Run the deployment described by deploy.toml
//!   check   Validate deploy.toml without connecting

use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Deploy {
            manifest,
            only_commands,
            batches,
        } => commands::deploy::cmd_deploy(
            &manifest,
            only_commands,
            &batches,
            cli.json,
            cli.verbose,
        ),
        Commands::Check { manifest } => {
            commands::check::cmd_check(&manifest, cli.json, cli.verbose)
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            commands::report_error(&err, cli.json);
            ExitCode::FAILURE
        }
    }
}
