//! # Repair
//!
//! A best-effort maintenance pass run before (or instead of) an inventory.
//!
//! ## Steps
//!
//! 1. OS update; a failure is analyzed for faulty mirrors
//! 2. OS upgrade; analyzed the same way
//! 3. Sanitize source lists for the detected hosts, then retry update and
//!    upgrade once if anything was disabled
//! 4. Remove cache directories
//! 5. Empty temporary directories
//! 6. Recreate the launcher symlink
//! 7. Make the entry point executable
//!
//! Every step appends a `<step>: <outcome>` line to the [`RepairResult`];
//! problems become lines starting with `warning: `. A repair never fails as
//! a whole. In simulate mode commands are simulated and steps 3 to 7 only
//! record `skip` lines.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config::RepairConfig;
use crate::detect::{resolve_os_manager, OsManager};
use crate::layers::os;
use crate::mirror::detect_faulty_hosts;
use crate::model::RepairResult;
use crate::process::{CommandOutput, CommandRunner};
use crate::sources;

const DRY_RUN_SKIP: &str = "skip (dry run)";

/// Runs the repair steps against one configuration.
pub struct Repairer<'a> {
    config: &'a RepairConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> Repairer<'a> {
    pub fn new(config: &'a RepairConfig, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    pub fn run(&self) -> RepairResult {
        let mut result = RepairResult::new();
        let simulate = self.config.simulate;

        let manager = match resolve_os_manager(&self.config.locator, self.config.os_manager.as_deref()) {
            Ok(manager) => Some(manager),
            Err(e) => {
                result.push(format!("warning: os manager: {}", e));
                None
            }
        };

        let mut hosts = BTreeSet::new();
        if let Some(manager) = &manager {
            let (_, output) = os::update(self.runner, manager, simulate);
            hosts.extend(record_command(&mut result, "update", &output));
            let (_, output) = os::upgrade(self.runner, manager, simulate);
            hosts.extend(record_command(&mut result, "upgrade", &output));
        }

        if simulate {
            result.push(format!("sanitize: {}", DRY_RUN_SKIP));
        } else {
            self.sanitize_and_retry(&mut result, manager.as_ref(), &hosts);
        }

        self.clean_caches(&mut result);
        self.clean_temp(&mut result);
        self.relink_entry_point(&mut result);
        self.make_entry_point_executable(&mut result);

        result
    }

    fn sanitize_and_retry(&self, result: &mut RepairResult, manager: Option<&OsManager>, hosts: &BTreeSet<String>) {
        if hosts.is_empty() {
            result.push("sanitize: skip (no faulty mirrors)");
            return;
        }

        let edits = sources::sanitize(&self.config.source_files, hosts);
        if edits.is_empty() {
            result.push(format!("sanitize: no source entries for {}", join_hosts(hosts)));
            return;
        }
        result.push(format!(
            "sanitize: disabled {} entr{} for {}",
            edits.len(),
            if edits.len() == 1 { "y" } else { "ies" },
            join_hosts(hosts)
        ));

        // Hosts are not re-analyzed after the retry.
        if let Some(manager) = manager {
            let (_, output) = os::update(self.runner, manager, false);
            record_retry(result, "retry update", &output);
            let (_, output) = os::upgrade(self.runner, manager, false);
            record_retry(result, "retry upgrade", &output);
        }
    }

    fn clean_caches(&self, result: &mut RepairResult) {
        for dir in &self.config.cache_dirs {
            let step = format!("clean cache {}", dir.display());
            if self.config.simulate {
                result.push(format!("{}: {}", step, DRY_RUN_SKIP));
                continue;
            }
            if !dir.exists() {
                result.push(format!("{}: absent", step));
                continue;
            }
            match fs::remove_dir_all(dir) {
                Ok(()) => result.push(format!("{}: removed", step)),
                Err(e) => result.push(format!("warning: {} failed: {}", step, e)),
            }
        }
    }

    fn clean_temp(&self, result: &mut RepairResult) {
        for dir in &self.config.temp_dirs {
            let step = format!("clean temp {}", dir.display());
            if self.config.simulate {
                result.push(format!("{}: {}", step, DRY_RUN_SKIP));
                continue;
            }
            if !dir.is_dir() {
                result.push(format!("{}: absent", step));
                continue;
            }
            match empty_dir(dir) {
                Ok(outcome) => result.push(describe_cleanup(&step, &outcome)),
                Err(e) => result.push(format!("warning: {} failed: {}", step, e)),
            }
        }
    }

    fn relink_entry_point(&self, result: &mut RepairResult) {
        let link = &self.config.entry_link;
        let target = &self.config.entry_point;
        if self.config.simulate {
            result.push(format!("symlink: {}", DRY_RUN_SKIP));
            return;
        }
        // The link path is only replaced when there is something to point at.
        let resolved_target = match fs::canonicalize(target) {
            Ok(resolved) => resolved,
            Err(e) => {
                result.push(format!(
                    "warning: symlink {} target missing: {} ({})",
                    link.display(),
                    target.display(),
                    e
                ));
                return;
            }
        };
        if fs::canonicalize(link).ok().as_ref() == Some(&resolved_target) {
            result.push(format!(
                "symlink: {} already points at {}",
                link.display(),
                target.display()
            ));
            return;
        }
        match replace_symlink(target, link) {
            Ok(()) => result.push(format!("symlink: {} -> {}", link.display(), target.display())),
            Err(e) => result.push(format!("warning: symlink {} failed: {}", link.display(), e)),
        }
    }

    fn make_entry_point_executable(&self, result: &mut RepairResult) {
        let target = &self.config.entry_point;
        if self.config.simulate {
            result.push(format!("chmod: {}", DRY_RUN_SKIP));
            return;
        }
        match add_execute_bits(target) {
            Ok(()) => result.push(format!("chmod: {} executable", target.display())),
            Err(e) => result.push(format!("warning: chmod {} failed: {}", target.display(), e)),
        }
    }
}

/// Record an update/upgrade outcome and return the faulty hosts it names.
fn record_command(result: &mut RepairResult, step: &str, output: &CommandOutput) -> BTreeSet<String> {
    if output.is_simulated() {
        result.push(format!("{}: simulated", step));
        return BTreeSet::new();
    }
    if !output.is_failure() {
        result.push(format!("{}: ok", step));
        return BTreeSet::new();
    }

    result.push(format!("warning: {} failed (exit {})", step, output.exit_code));
    let hosts = detect_faulty_hosts(&format!("{}\n{}", output.stderr, output.stdout));
    if hosts.is_empty() {
        result.push("detect: no faulty mirrors".to_string());
    } else {
        result.push(format!("detect: {}", join_hosts(&hosts)));
    }
    hosts
}

fn record_retry(result: &mut RepairResult, step: &str, output: &CommandOutput) {
    if output.is_failure() {
        result.push(format!("warning: {} failed (exit {})", step, output.exit_code));
    } else {
        result.push(format!("{}: ok", step));
    }
}

fn join_hosts(hosts: &BTreeSet<String>) -> String {
    hosts.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// What emptying a directory managed to do.
#[derive(Debug, Default)]
struct EmptyDirOutcome {
    removed: usize,
    failed: Vec<(PathBuf, io::Error)>,
}

/// Remove every entry of `dir`, keeping `dir` itself.
fn empty_dir(dir: &Path) -> io::Result<EmptyDirOutcome> {
    empty_dir_with(dir, remove_entry)
}

/// Best-effort: an entry that cannot be removed is recorded and the rest
/// are still attempted. Only an unreadable `dir` is an error.
fn empty_dir_with(dir: &Path, remove: impl Fn(&Path) -> io::Result<()>) -> io::Result<EmptyDirOutcome> {
    let mut outcome = EmptyDirOutcome::default();
    for entry in fs::read_dir(dir)? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                outcome.failed.push((dir.to_path_buf(), e));
                continue;
            }
        };
        match remove(&path) {
            Ok(()) => outcome.removed += 1,
            Err(e) => {
                warn!("Could not remove {}: {}", path.display(), e);
                outcome.failed.push((path, e));
            }
        }
    }
    debug!(
        "Removed {} entries from {} ({} failed)",
        outcome.removed,
        dir.display(),
        outcome.failed.len()
    );
    Ok(outcome)
}

fn describe_cleanup(step: &str, outcome: &EmptyDirOutcome) -> String {
    match outcome.failed.first() {
        None => format!("{}: removed {} entries", step, outcome.removed),
        Some((path, e)) => format!(
            "warning: {}: removed {} entries, {} failed: {}: {}",
            step,
            outcome.removed,
            outcome.failed.len(),
            path.display(),
            e
        ),
    }
}

fn remove_entry(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(unix)]
fn replace_symlink(target: &Path, link: &Path) -> io::Result<()> {
    if fs::symlink_metadata(link).is_ok() {
        fs::remove_file(link)?;
    }
    if let Some(parent) = link.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn replace_symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "symlinks need a unix host"))
}

#[cfg(unix)]
fn add_execute_bits(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn add_execute_bits(path: &Path) -> io::Result<()> {
    fs::metadata(path).map(|_| ())
}
