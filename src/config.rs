//! # Run Configuration
//!
//! Explicit configuration handed to the [`Aggregator`](crate::aggregate::Aggregator)
//! and the [`Repairer`](crate::repair::Repairer) at construction. Nothing in
//! the library reads global state; the CLI assembles these structs from
//! flags, environment variables and [`defaults`](crate::defaults).

use std::path::PathBuf;

use crate::defaults;
use crate::detect::ToolLocator;
use crate::model::Mode;

/// Settings for an inventory run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: Mode,
    /// Directory whose subdirectories are virtualenvs.
    pub venv_root: PathBuf,
    /// Run every command in simulate mode.
    pub simulate: bool,
    /// OS package manager to use instead of probing.
    pub os_manager: Option<String>,
    pub locator: ToolLocator,
    /// Host name recorded in the inventory.
    pub host: String,
}

impl RunConfig {
    pub fn new(mode: Mode, venv_root: PathBuf) -> Self {
        Self {
            mode,
            venv_root,
            simulate: false,
            os_manager: None,
            locator: ToolLocator::from_env(),
            host: defaults::host_name(),
        }
    }

    pub fn simulate(mut self, simulate: bool) -> Self {
        self.simulate = simulate;
        self
    }

    pub fn with_os_manager(mut self, os_manager: Option<String>) -> Self {
        self.os_manager = os_manager;
        self
    }

    pub fn with_locator(mut self, locator: ToolLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}

/// Settings for a repair pass.
#[derive(Debug, Clone)]
pub struct RepairConfig {
    /// Run every command in simulate mode and leave the filesystem alone.
    pub simulate: bool,
    pub os_manager: Option<String>,
    pub locator: ToolLocator,
    /// apt source lists that may be sanitized.
    pub source_files: Vec<PathBuf>,
    /// Cache directories removed outright.
    pub cache_dirs: Vec<PathBuf>,
    /// Temporary directories emptied but kept.
    pub temp_dirs: Vec<PathBuf>,
    /// The script the launcher symlink must point at.
    pub entry_point: PathBuf,
    /// Where the launcher symlink lives.
    pub entry_link: PathBuf,
}

impl RepairConfig {
    /// Configuration pointing at the standard Termux locations.
    pub fn termux_defaults() -> Self {
        let prefix = defaults::termux_prefix();
        Self {
            simulate: false,
            os_manager: None,
            locator: ToolLocator::from_env(),
            source_files: defaults::source_files(&prefix),
            cache_dirs: defaults::cache_dirs(),
            temp_dirs: defaults::temp_dirs(&prefix),
            entry_point: defaults::entry_point(),
            entry_link: defaults::entry_link(&prefix),
        }
    }

    pub fn simulate(mut self, simulate: bool) -> Self {
        self.simulate = simulate;
        self
    }
}
