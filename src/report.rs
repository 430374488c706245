//! # Output Documents
//!
//! The three JSON documents a run leaves behind:
//!
//! - inventory: [`InventoryDocument`] `{generated, mode, dry_run, inventory}`
//! - issues: [`IssuesDocument`] `{generated, issues}`
//! - repair: the [`RepairResult`] as-is
//!
//! Every document is written with [`write_json_atomic`]: pretty JSON goes to
//! `<path>.tmp` first and is then renamed over `<path>`, so a reader never
//! sees a half-written file.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Inventory, Issue, Mode, RepairResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryDocument {
    pub generated: DateTime<Utc>,
    pub mode: Mode,
    pub dry_run: bool,
    pub inventory: Inventory,
}

impl InventoryDocument {
    pub fn new(inventory: Inventory, dry_run: bool) -> Self {
        Self {
            generated: Utc::now(),
            mode: inventory.mode,
            dry_run,
            inventory,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuesDocument {
    pub generated: DateTime<Utc>,
    pub issues: Vec<Issue>,
}

impl IssuesDocument {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            generated: Utc::now(),
            issues,
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let output_error = |message: String| Error::Output {
        path: path.to_path_buf(),
        message,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| output_error(e.to_string()))?;
    }

    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    let tmp = temp_path(path);
    fs::write(&tmp, json).map_err(|e| output_error(e.to_string()))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(output_error(e.to_string()));
    }

    info!("Wrote {}", path.display());
    Ok(())
}

pub fn write_inventory(path: &Path, inventory: &Inventory, dry_run: bool) -> Result<()> {
    write_json_atomic(path, &InventoryDocument::new(inventory.clone(), dry_run))
}

pub fn write_issues(path: &Path, issues: &[Issue]) -> Result<()> {
    write_json_atomic(path, &IssuesDocument::new(issues.to_vec()))
}

pub fn write_repair(path: &Path, result: &RepairResult) -> Result<()> {
    write_json_atomic(path, result)
}
