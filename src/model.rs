//! # Data Model
//!
//! Plain data produced by the collectors, the aggregator and the repair
//! orchestrator. Every type here serializes straight into the JSON documents
//! written at the end of a run, so field names are part of the output format.
//!
//! - [`PackageRecord`]: one installed package as reported by a manager.
//! - [`Issue`]: one failed operation, tagged with an [`IssueCategory`].
//! - [`Inventory`]: everything listed during one run, shaped by [`Mode`].
//! - [`RepairResult`]: the ordered narrative of a repair pass.
//! - [`SourceEdit`]: one source-list line disabled by the sanitizer.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version string used whenever a listing does not yield a usable version.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Which layers a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Mode {
    /// OS packages only
    #[value(name = "A")]
    A,
    /// OS packages and the system pip
    #[value(name = "B")]
    B,
    /// OS packages, system pip and every virtualenv
    #[value(name = "C")]
    C,
    /// Like C, and upgrade pip and virtualenv packages in place
    #[value(name = "D")]
    D,
}

impl Mode {
    /// Whether the system pip layer is listed.
    pub fn includes_system_pip(self) -> bool {
        matches!(self, Mode::B | Mode::C | Mode::D)
    }

    /// Whether per-environment layers are listed.
    pub fn includes_environments(self) -> bool {
        matches!(self, Mode::C | Mode::D)
    }

    /// Whether pip layers are upgraded after listing.
    pub fn upgrades(self) -> bool {
        self == Mode::D
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Mode::A => "A",
            Mode::B => "B",
            Mode::C => "C",
            Mode::D => "D",
        };
        f.write_str(letter)
    }
}

/// One installed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    /// The listing line this record was parsed from (OS layer only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            raw: None,
        }
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }
}

/// What kind of operation an [`Issue`] comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    PkgUpdate,
    PkgUpgrade,
    PkgList,
    PipExec,
    PipListParse,
    PipUpgrade,
    SystemPipMissing,
    PkgException,
}

impl IssueCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCategory::PkgUpdate => "pkg_update",
            IssueCategory::PkgUpgrade => "pkg_upgrade",
            IssueCategory::PkgList => "pkg_list",
            IssueCategory::PipExec => "pip_exec",
            IssueCategory::PipListParse => "pip_list_parse",
            IssueCategory::PipUpgrade => "pip_upgrade",
            IssueCategory::SystemPipMissing => "system_pip_missing",
            IssueCategory::PkgException => "pkg_exception",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub category: IssueCategory,
    pub command: Vec<String>,
    pub exit_code: i32,
    pub stderr: String,
    /// Set only for issues raised inside a virtualenv.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_label: Option<String>,
}

impl Issue {
    pub fn new(
        category: IssueCategory,
        command: Vec<String>,
        exit_code: i32,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            category,
            command,
            exit_code,
            stderr: stderr.into(),
            environment_label: None,
        }
    }

    /// Tag this issue with the environment it originated from.
    pub fn in_environment(mut self, label: impl Into<String>) -> Self {
        self.environment_label = Some(label.into());
        self
    }
}

/// Packages listed from a single virtualenv.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentInventory {
    pub manager_path: PathBuf,
    pub packages: Vec<PackageRecord>,
}

/// Everything listed during one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub timestamp: DateTime<Utc>,
    pub mode: Mode,
    pub host: String,
    pub os_packages: Vec<PackageRecord>,
    pub system_language_packages: Vec<PackageRecord>,
    pub environments: BTreeMap<String, EnvironmentInventory>,
}

impl Inventory {
    /// An inventory with no packages, stamped now.
    pub fn empty(mode: Mode, host: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            mode,
            host: host.into(),
            os_packages: Vec::new(),
            system_language_packages: Vec::new(),
            environments: BTreeMap::new(),
        }
    }
}

/// The ordered log of a repair pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairResult {
    pub timestamp: DateTime<Utc>,
    pub steps: Vec<String>,
}

impl RepairResult {
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            steps: Vec::new(),
        }
    }

    /// Append a step, logging it as it happens.
    pub fn push(&mut self, step: impl Into<String>) {
        let step = step.into();
        if step.starts_with("warning:") {
            log::warn!("repair: {}", step);
        } else {
            log::info!("repair: {}", step);
        }
        self.steps.push(step);
    }
}

impl Default for RepairResult {
    fn default() -> Self {
        Self::new()
    }
}

/// A source-list line that was commented out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEdit {
    pub file: PathBuf,
    pub original_line: String,
    pub host: String,
}
