//! CLI argument parsing and command dispatch

use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use aktualizator::output::OutputConfig;

use crate::commands;

/// Aktualizator - Update and inventory OS, pip and virtualenv packages
#[derive(Parser, Debug)]
#[command(name = "aktualizator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Log command traces (same as --log-level debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Update every package layer and write the inventory and issues documents
    Run(commands::run::RunArgs),

    /// Repair package mirrors, caches and the launcher without an inventory
    Repair(commands::repair::RepairArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level, self.verbose)?;

        let output = OutputConfig::from_env_and_flag(&self.color);
        output.apply();

        match self.command {
            Commands::Run(args) => commands::run::execute(args, &output),
            Commands::Repair(args) => commands::repair::execute(args, &output),
        }
    }
}

/// Resolve the log filter. `--verbose` wins over `--log-level`.
fn log_filter(log_level: &str, verbose: bool) -> Result<LevelFilter> {
    if verbose {
        return Ok(LevelFilter::Debug);
    }
    LevelFilter::from_str(log_level)
        .map_err(|_| anyhow::anyhow!("Invalid log level: {log_level}\n\nhint: Use one of error, warn, info, debug, trace"))
}

/// Initialize `env_logger`. `RUST_LOG` overrides the flags when set.
fn init_logging(log_level: &str, verbose: bool) -> Result<()> {
    let filter = log_filter(log_level, verbose)?;
    let mut builder = env_logger::Builder::new();
    builder.filter_level(filter).format_timestamp(None);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    // A logger may already be installed when executed from tests.
    let _ = builder.try_init();
    Ok(())
}
