//! Process exit codes used by the `aktualizator` binary.
//!
//! Issues found during a run do not change the exit code; they are reported
//! in the issues document.

/// The command completed.
pub const SUCCESS: u8 = 0;

/// A fatal error, such as an output document that could not be written.
pub const ERROR: u8 = 1;

/// Invalid command-line usage. Produced by clap itself.
pub const USAGE: u8 = 2;

/// The run lock could not be obtained; nothing was changed.
pub const LOCK_UNAVAILABLE: u8 = 3;
