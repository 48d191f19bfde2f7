use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rdeploy::manifest::DEFAULT_MANIFEST;

/// rdeploy - mirror a tree, write artifacts, run maintenance commands over SSH
#[derive(Parser, Debug)]
#[command(name = "rdeploy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// NDJSON events and a JSON report on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v: every step, -vv: command output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the deployment described by the manifest
    Deploy {
        /// Path to the manifest
        #[arg(short, long, default_value = DEFAULT_MANIFEST)]
        manifest: PathBuf,

        /// Skip sync and artifact stages; run command batches only
        #[arg(long)]
        only_commands: bool,

        /// Run only these batches (can be specified multiple times)
        #[arg(long = "batch", value_name = "NAME")]
        batches: Vec<String>,
    },

    /// Validate the manifest and print the plan without connecting
    Check {
        /// Path to the manifest
        #[arg(short, long, default_value = DEFAULT_MANIFEST)]
        manifest: PathBuf,
    },
}
