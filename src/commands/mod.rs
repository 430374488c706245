//! # CLI Command Implementations
//!
//! One module per subcommand of the `aktualizator` tool. Each contains an
//! `Args` struct derived with `clap` and an `execute` function that builds
//! the library configuration from the arguments and [`aktualizator::defaults`],
//! runs it, and persists the resulting documents.
//!
//! - [`run`]: optional repair, then the inventory run, under the run lock
//! - [`repair`]: the repair pass on its own, without the lock

pub mod repair;
pub mod run;
