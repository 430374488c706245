//! # Aktualizator Library
//!
//! Keeps a Termux (or other Linux) installation up to date and records what
//! is installed. One run drives three layers of package managers:
//!
//! - the OS package manager (`pkg`, `apt`, `apk` or `pacman`),
//! - the system pip,
//! - one pip per virtualenv under a configured root.
//!
//! The result is an [`Inventory`](model::Inventory) of installed packages and
//! a list of [`Issue`](model::Issue)s describing every command that failed.
//! Optionally a [`repair`] pass runs first and disables apt mirrors that
//! publish unsigned or expired release metadata.
//!
//! ## Quick Example
//!
//! ```no_run
//! use aktualizator::aggregate::Aggregator;
//! use aktualizator::config::RunConfig;
//! use aktualizator::model::Mode;
//! use aktualizator::process::SystemRunner;
//!
//! let config = RunConfig::new(Mode::A, "/home/user/venv".into()).simulate(true);
//! let outcome = Aggregator::new(&config, &SystemRunner).run();
//! assert!(outcome.inventory.os_packages.is_empty());
//! ```
//!
//! ## Core Concepts
//!
//! - **Process runner (`process`)**: every external command goes through the
//!   [`CommandRunner`](process::CommandRunner) trait, which never fails and
//!   supports simulate mode.
//! - **Detection (`detect`)**: finds the package managers.
//! - **Layers (`layers`)**: update, upgrade and list one kind of manager.
//! - **Parsing (`parse`, `mirror`)**: pure functions over command output.
//! - **Repair (`repair`, `sources`)**: mirror sanitizing and housekeeping.
//! - **Aggregation (`aggregate`)**: runs the layers selected by the mode.
//! - **Persistence (`report`)**: atomic JSON documents.
//! - **Run guard (`guard`)**: one run at a time across processes.

pub mod aggregate;
pub mod config;
pub mod defaults;
pub mod detect;
pub mod error;
pub mod exit_codes;
pub mod guard;
pub mod layers;
pub mod mirror;
pub mod model;
pub mod output;
pub mod parse;
pub mod process;
pub mod repair;
pub mod report;
pub mod sources;
pub mod suggestions;

#[cfg(test)]
mod parse_proptest;
