//! Default values for aktualizator configuration.
//!
//! This module provides centralized default paths used across commands. The
//! layout follows Termux: packages live under `$PREFIX` (normally
//! `/data/data/com.termux/files/usr`) and shared storage is linked at
//! `~/storage`.
//!
//! Every default can be overridden by a CLI flag or environment variable.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// `$PREFIX` of a stock Termux installation.
pub const TERMUX_PREFIX: &str = "/data/data/com.termux/files/usr";

pub const INVENTORY_FILE: &str = "Aktualizator_seznam.json";
pub const ISSUES_FILE: &str = "Aktualizator_issue.json";
pub const REPAIR_FILE: &str = "Aktualizator_repair.json";
pub const LOCK_FILE: &str = ".aktualizator.lock";

/// Additional apt source lists Termux ships besides `sources.list`.
const EXTRA_SOURCE_LISTS: [&str; 4] = ["root.list", "x11.list", "game.list", "science.list"];

/// The user's home directory, or the current directory if unknown.
pub fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Termux `$PREFIX`, falling back to the stock location.
pub fn termux_prefix() -> PathBuf {
    env::var_os("PREFIX")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(TERMUX_PREFIX))
}

/// Directory where output documents are written.
///
/// Prefers Termux shared storage (`~/storage/downloads`) so the files are
/// visible from Android, then `~/Downloads`.
pub fn output_dir() -> PathBuf {
    output_dir_in(&home_dir())
}

pub fn output_dir_in(home: &Path) -> PathBuf {
    let shared = home.join("storage").join("downloads");
    if shared.is_dir() {
        shared
    } else {
        home.join("Downloads")
    }
}

pub fn inventory_path() -> PathBuf {
    output_dir().join(INVENTORY_FILE)
}

pub fn issues_path() -> PathBuf {
    output_dir().join(ISSUES_FILE)
}

pub fn repair_path() -> PathBuf {
    output_dir().join(REPAIR_FILE)
}

pub fn lock_path() -> PathBuf {
    home_dir().join(LOCK_FILE)
}

/// Directory scanned for virtualenvs.
pub fn venv_root() -> PathBuf {
    home_dir().join("venv")
}

/// apt source lists the sanitizer may edit.
pub fn source_files(prefix: &Path) -> Vec<PathBuf> {
    let apt = prefix.join("etc").join("apt");
    let mut files = vec![apt.join("sources.list")];
    files.extend(
        EXTRA_SOURCE_LISTS
            .iter()
            .map(|name| apt.join("sources.list.d").join(name)),
    );
    files
}

/// pip and Jupyter caches that are safe to delete.
pub fn cache_dirs() -> Vec<PathBuf> {
    let home = home_dir();
    vec![
        home.join(".cache").join("pip"),
        home.join(".local").join("share").join("jupyter").join("runtime"),
    ]
}

/// Temporary directories whose contents are safe to delete.
pub fn temp_dirs(prefix: &Path) -> Vec<PathBuf> {
    vec![prefix.join("tmp")]
}

/// The launcher script the `aktualizator` command should run.
pub fn entry_point() -> PathBuf {
    home_dir().join(".aktualizator").join("aktualizator")
}

/// Where the `aktualizator` command symlink lives.
pub fn entry_link(prefix: &Path) -> PathBuf {
    prefix.join("bin").join("aktualizator")
}

/// The host name recorded in inventories.
pub fn host_name() -> String {
    ["/proc/sys/kernel/hostname", "/etc/hostname"]
        .iter()
        .filter_map(|p| fs::read_to_string(p).ok())
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .or_else(|| env::var("HOSTNAME").ok().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| "termux".to_string())
}
