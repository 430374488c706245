//! # Aktualizator CLI
//!
//! This is the binary entry point for the `aktualizator` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the selected command.
//! - Translating errors into an exit code from [`aktualizator::exit_codes`].
//!
//! All real work happens in the `aktualizator` library crate.

mod cli;
mod commands;

use std::process::ExitCode;

use aktualizator::error::Error;
use aktualizator::exit_codes;
use clap::Parser;

/// Map a fatal error to the process exit code.
fn exit_code_for(error: &anyhow::Error) -> u8 {
    let lock_failure = error
        .chain()
        .any(|cause| matches!(cause.downcast_ref::<Error>(), Some(Error::Lock { .. })));
    if lock_failure {
        exit_codes::LOCK_UNAVAILABLE
    } else {
        exit_codes::ERROR
    }
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}
