//! Config command implementation.

use crate::core::config::Config;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Configuration operations.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate a configuration file.
    Validate {
        /// Config file path.
        #[arg(default_value = "config/vigil.toml")]
        path: PathBuf,
    },
    /// Print the effective configuration (file, env, defaults).
    Show {
        /// Config file path; defaults apply when omitted.
        path: Option<PathBuf>,
    },
}

/// Run the config command.
pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommand::Validate { path } => {
            let parsed = Config::from_file(&path)?;
            parsed.validate()?;
            println!("configuration OK: {}", path.display());
            Ok(())
        }
        ConfigCommand::Show { path } => {
            let mut parsed = Config::load(path.as_deref())?;
            parsed.apply_env_overrides()?;
            let rendered =
                toml::to_string_pretty(&parsed).context("failed to render configuration")?;
            print!("{rendered}");
            Ok(())
        }
    }
}
