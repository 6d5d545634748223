//! vigil - unified CLI entrypoint.
//!
//! Usage:
//!   vigil run [--workers N] [--keys-per-worker K] [--cycles C]
//!   vigil config validate --config config/vigil.toml
//!   vigil config show

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use vigil::cli::commands::{run_config, run_harness};
use vigil::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Explicit --config wins; otherwise pick up the default file when it
    // exists, and fall back to built-in defaults when it does not.
    let config_path = cli.config.map(PathBuf::from).or_else(default_config_path);

    match cli.command {
        Commands::Run(args) => run_harness(args, config_path.as_deref()).await,
        Commands::Config(args) => run_config(args),
    }
}

fn default_config_path() -> Option<PathBuf> {
    let path = PathBuf::from("config/vigil.toml");
    path.exists().then_some(path)
}
