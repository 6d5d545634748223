//! Command-line interface.

pub mod commands;

use clap::{Parser, Subcommand};

/// vigil - consistency stress harness for replicated key-value stores.
#[derive(Parser, Debug)]
#[command(name = "vigil")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path.
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the harness against the configured store.
    Run(commands::RunArgs),
    /// Configuration operations.
    Config(commands::ConfigArgs),
}
