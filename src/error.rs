//! # Error Handling
//!
//! This module defines the error type shared by the `aktualizator` library.
//!
//! Most failures in this crate are *not* errors: a failed package-manager
//! command, an unparseable listing or a missing pip all become structured
//! [`Issue`](crate::model::Issue) records or repair-log warnings, and the run
//! carries on. The variants below cover the few conditions that genuinely
//! stop an operation:
//!
//! - the run lock could not be obtained (the only fatal condition of a run),
//! - an explicitly configured OS package manager is not one we know how to drive,
//! - an output document could not be written.
//!
//! The `Result` alias is used throughout the library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for aktualizator operations
#[derive(Error, Debug)]
pub enum Error {
    /// The exclusive run lock could not be obtained.
    #[error("Unable to acquire run lock {}: {message}", path.display())]
    Lock { path: PathBuf, message: String },

    /// A package manager was requested that has no known command vocabulary.
    #[error("Unsupported package manager: {name}")]
    UnsupportedManager { name: String },

    /// An output document could not be persisted.
    #[error("Failed to write {}: {message}", path.display())]
    Output { path: PathBuf, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
