//! Run command implementation
//!
//! The run command:
//! 1. Takes the run lock (unless `--no-lock`)
//! 2. Optionally runs the repair pass (`--repair`)
//! 3. Updates and inventories the layers selected by `--mode`
//! 4. Writes the inventory and issues documents
//! 5. Prints a summary of the issues

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Args;

use aktualizator::aggregate::{Aggregator, RunOutcome};
use aktualizator::config::RunConfig;
use aktualizator::guard::RunGuard;
use aktualizator::model::Mode;
use aktualizator::output::{self, emoji, OutputConfig};
use aktualizator::process::{CommandRunner, SystemRunner};
use aktualizator::{defaults, report, suggestions};

use super::repair::{repair_and_report, RepairPathArgs};

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Layers to process: A = OS only, B = + system pip, C = + virtualenvs, D = C with upgrades
    #[arg(long, value_enum, default_value = "C", env = "AKTUALIZATOR_MODE")]
    pub mode: Mode,

    /// Directory whose subdirectories are virtualenvs [default: ~/venv]
    #[arg(long, value_name = "PATH", env = "AKTUALIZATOR_VENV_DIR")]
    pub venv_dir: Option<PathBuf>,

    /// Show what would be done without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Do not take the run lock
    #[arg(long)]
    pub no_lock: bool,

    /// Lock file serializing runs [default: ~/.aktualizator.lock]
    #[arg(long, value_name = "PATH")]
    pub lock_file: Option<PathBuf>,

    /// Run the repair pass before the inventory
    #[arg(long)]
    pub repair: bool,

    /// OS package manager to use instead of probing (name or path)
    #[arg(long, value_name = "NAME")]
    pub os_manager: Option<String>,

    /// Where to write the inventory document
    #[arg(long, value_name = "PATH")]
    pub out_inventory: Option<PathBuf>,

    /// Where to write the issues document
    #[arg(long, value_name = "PATH")]
    pub out_issues: Option<PathBuf>,

    /// Where to write the repair document
    #[arg(long, value_name = "PATH")]
    pub out_repair: Option<PathBuf>,

    #[command(flatten)]
    pub repair_paths: RepairPathArgs,
}

/// Execute the run command
pub fn execute(args: RunArgs, output: &OutputConfig) -> Result<()> {
    let start_time = Instant::now();

    let lock_path = args.lock_file.clone().unwrap_or_else(defaults::lock_path);
    let _guard = if args.no_lock {
        None
    } else {
        Some(RunGuard::acquire(&lock_path).map_err(|e| suggestions::lock_unavailable(&lock_path, e))?)
    };

    if args.dry_run {
        println!(
            "{} DRY RUN MODE - No changes will be made",
            emoji(output, "🔎", "[DRY RUN]")
        );
        println!();
    }

    let runner = SystemRunner;
    if args.repair {
        let config = args
            .repair_paths
            .to_config(args.dry_run, args.os_manager.clone());
        repair_and_report(&config, &runner, args.out_repair.clone(), output)?;
        println!();
    }

    let config = RunConfig::new(args.mode, args.venv_dir.clone().unwrap_or_else(defaults::venv_root))
        .simulate(args.dry_run)
        .with_os_manager(args.os_manager.clone());
    let outcome = collect_and_report(&config, &runner, &args)?;

    print!("{}", output::render_issue_summary(output, &outcome.issues));
    println!(
        "{} Mode {} finished in {:.2}s",
        emoji(output, "✅", "[DONE]"),
        config.mode,
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

fn collect_and_report(config: &RunConfig, runner: &dyn CommandRunner, args: &RunArgs) -> Result<RunOutcome> {
    let outcome = Aggregator::new(config, runner).run();
    output::log_issues(&outcome.issues);

    let inventory_path = args.out_inventory.clone().unwrap_or_else(defaults::inventory_path);
    report::write_inventory(&inventory_path, &outcome.inventory, config.simulate)
        .map_err(|e| suggestions::output_unwritable(&inventory_path, e))?;

    let issues_path = args.out_issues.clone().unwrap_or_else(defaults::issues_path);
    report::write_issues(&issues_path, &outcome.issues)
        .map_err(|e| suggestions::output_unwritable(&issues_path, e))?;

    println!("   Inventory written to: {}", inventory_path.display());
    println!("   Issues written to: {}", issues_path.display());
    Ok(outcome)
}
