//! Repair command implementation
//!
//! Runs the repair pass on its own: mirror sanitizing, cache and temp
//! cleanup, and the launcher symlink. Writes the repair document and prints
//! the step log. Never takes the run lock.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use aktualizator::config::RepairConfig;
use aktualizator::model::RepairResult;
use aktualizator::output::{self, emoji, OutputConfig};
use aktualizator::process::{CommandRunner, SystemRunner};
use aktualizator::repair::Repairer;
use aktualizator::{defaults, report, suggestions};

/// Locations the repair pass works on. Empty lists mean the Termux defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct RepairPathArgs {
    /// apt source list that may be sanitized (repeatable)
    #[arg(long = "sources", value_name = "FILE")]
    pub sources: Vec<PathBuf>,

    /// Cache directory to remove (repeatable)
    #[arg(long = "cache-dir", value_name = "DIR")]
    pub cache_dirs: Vec<PathBuf>,

    /// Temporary directory to empty (repeatable)
    #[arg(long = "temp-dir", value_name = "DIR")]
    pub temp_dirs: Vec<PathBuf>,

    /// Script the launcher symlink points at
    #[arg(long, value_name = "PATH")]
    pub entry_point: Option<PathBuf>,

    /// Path of the launcher symlink
    #[arg(long, value_name = "PATH")]
    pub entry_link: Option<PathBuf>,
}

impl RepairPathArgs {
    /// Build the repair configuration, filling gaps from the defaults.
    pub fn to_config(&self, simulate: bool, os_manager: Option<String>) -> RepairConfig {
        let mut config = RepairConfig::termux_defaults().simulate(simulate);
        config.os_manager = os_manager;
        if !self.sources.is_empty() {
            config.source_files = self.sources.clone();
        }
        if !self.cache_dirs.is_empty() {
            config.cache_dirs = self.cache_dirs.clone();
        }
        if !self.temp_dirs.is_empty() {
            config.temp_dirs = self.temp_dirs.clone();
        }
        if let Some(entry_point) = &self.entry_point {
            config.entry_point = entry_point.clone();
        }
        if let Some(entry_link) = &self.entry_link {
            config.entry_link = entry_link.clone();
        }
        config
    }
}

/// Arguments for the repair command
#[derive(Args, Debug)]
pub struct RepairArgs {
    /// Show what would be done without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Where to write the repair document
    #[arg(long, value_name = "PATH")]
    pub out_repair: Option<PathBuf>,

    /// OS package manager to use instead of probing (name or path)
    #[arg(long, value_name = "NAME")]
    pub os_manager: Option<String>,

    #[command(flatten)]
    pub paths: RepairPathArgs,
}

/// Run a repair pass and persist its document. Shared with `run --repair`.
pub fn repair_and_report(
    config: &RepairConfig,
    runner: &dyn CommandRunner,
    out_repair: Option<PathBuf>,
    output: &OutputConfig,
) -> Result<RepairResult> {
    let result = Repairer::new(config, runner).run();

    let path = out_repair.unwrap_or_else(defaults::repair_path);
    report::write_repair(&path, &result).map_err(|e| suggestions::output_unwritable(&path, e))?;

    print!("{}", output::render_repair_summary(output, &result));
    println!("   Repair log written to: {}", path.display());
    Ok(result)
}

/// Execute the repair command
pub fn execute(args: RepairArgs, output: &OutputConfig) -> Result<()> {
    if args.dry_run {
        println!(
            "{} DRY RUN MODE - No changes will be made",
            emoji(output, "🔎", "[DRY RUN]")
        );
        println!();
    }

    let config = args.paths.to_config(args.dry_run, args.os_manager);
    repair_and_report(&config, &SystemRunner, args.out_repair, output)?;
    Ok(())
}
