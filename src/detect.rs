//! # Environment Detection
//!
//! Finds the three kinds of package manager a run drives:
//!
//! - the OS package manager ([`detect_os_manager`]), probed in preference
//!   order and never failing,
//! - the system pip ([`find_system_pip`]), which may legitimately be absent,
//! - one pip per virtualenv under a root directory
//!   ([`find_environment_managers`]).
//!
//! Binary lookup goes through [`ToolLocator`] so tests can point it at a
//! controlled search path instead of the process `PATH`.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};
use crate::process::command;

/// OS package managers in probe order. The first one is the fallback.
pub const OS_MANAGER_PREFERENCE: [&str; 4] = ["pkg", "apt", "apk", "pacman"];

/// System pip names in probe order.
pub const SYSTEM_PIP_NAMES: [&str; 2] = ["pip3", "pip"];

/// Locations of pip inside a virtualenv, relative to the environment root.
pub const ENVIRONMENT_PIP_CANDIDATES: [&str; 3] = ["bin/pip3", "bin/pip", "Scripts/pip.exe"];

/// Looks up executables on a search path.
#[derive(Debug, Clone, Default)]
pub struct ToolLocator {
    search_path: Option<OsString>,
}

impl ToolLocator {
    /// Search the process `PATH`.
    pub fn from_env() -> Self {
        Self { search_path: None }
    }

    /// Search only the given `PATH`-style list of directories.
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    pub fn find(&self, name: &str) -> Option<PathBuf> {
        let found = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
                which::which_in(name, Some(paths), cwd)
            }
            None => which::which(name),
        };
        found.ok()
    }
}

/// The OS package-manager families we know how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsManagerKind {
    /// Termux `pkg` wrapper around apt
    Pkg,
    Apt,
    Apk,
    Pacman,
}

impl OsManagerKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pkg" => Some(OsManagerKind::Pkg),
            "apt" | "apt-get" => Some(OsManagerKind::Apt),
            "apk" => Some(OsManagerKind::Apk),
            "pacman" => Some(OsManagerKind::Pacman),
            _ => None,
        }
    }
}

/// A resolved OS package manager and its command vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsManager {
    pub kind: OsManagerKind,
    /// What to put in argv[0]: a bare name when probed, a path when configured.
    pub program: String,
}

impl OsManager {
    pub fn new(kind: OsManagerKind, program: impl Into<String>) -> Self {
        Self {
            kind,
            program: program.into(),
        }
    }

    /// Resolve an explicitly configured manager (name or path).
    pub fn from_program(program: &str) -> Result<Self> {
        let file_name = Path::new(program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(program);
        let kind = OsManagerKind::from_name(file_name).ok_or_else(|| Error::UnsupportedManager {
            name: program.to_string(),
        })?;
        Ok(Self::new(kind, program))
    }

    /// Refresh the package index.
    pub fn update_command(&self) -> Vec<String> {
        let p = self.program.as_str();
        match self.kind {
            OsManagerKind::Pkg | OsManagerKind::Apt => command(&[p, "update", "-y"]),
            OsManagerKind::Apk => command(&[p, "update"]),
            OsManagerKind::Pacman => command(&[p, "-Sy", "--noconfirm"]),
        }
    }

    /// Upgrade all installed packages non-interactively.
    pub fn upgrade_command(&self) -> Vec<String> {
        let p = self.program.as_str();
        match self.kind {
            OsManagerKind::Pkg | OsManagerKind::Apt => command(&[p, "upgrade", "-y"]),
            OsManagerKind::Apk => command(&[p, "upgrade", "--no-interactive"]),
            OsManagerKind::Pacman => command(&[p, "-Su", "--noconfirm"]),
        }
    }

    /// List installed packages.
    pub fn list_command(&self) -> Vec<String> {
        let p = self.program.as_str();
        match self.kind {
            OsManagerKind::Pkg => command(&[p, "list-installed"]),
            OsManagerKind::Apt => command(&[p, "list", "--installed"]),
            OsManagerKind::Apk => command(&[p, "info", "-v"]),
            OsManagerKind::Pacman => command(&[p, "-Q"]),
        }
    }
}

impl fmt::Display for OsManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)
    }
}

/// Probe for the OS package manager; falls back to `pkg` when none is found.
pub fn detect_os_manager(locator: &ToolLocator) -> OsManager {
    for name in OS_MANAGER_PREFERENCE {
        if locator.find(name).is_some() {
            if let Some(kind) = OsManagerKind::from_name(name) {
                return OsManager::new(kind, name);
            }
        }
    }
    debug!("No OS package manager found, falling back to pkg");
    OsManager::new(OsManagerKind::Pkg, OS_MANAGER_PREFERENCE[0])
}

/// Use the configured manager if there is one, otherwise probe.
pub fn resolve_os_manager(locator: &ToolLocator, configured: Option<&str>) -> Result<OsManager> {
    match configured {
        Some(program) => OsManager::from_program(program),
        None => Ok(detect_os_manager(locator)),
    }
}

/// Find the system-wide pip, preferring `pip3`.
pub fn find_system_pip(locator: &ToolLocator) -> Option<PathBuf> {
    SYSTEM_PIP_NAMES.iter().find_map(|name| locator.find(name))
}

/// A virtualenv and the pip that manages it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentManager {
    /// The environment's directory name.
    pub label: String,
    pub manager_path: PathBuf,
}

/// Find one pip per immediate subdirectory of `root`.
///
/// Results follow directory listing order, which is platform dependent. A
/// missing or unreadable root yields an empty list.
pub fn find_environment_managers(root: &Path) -> Vec<EnvironmentManager> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot read environment root {}: {}", root.display(), e);
            return Vec::new();
        }
    };

    let mut managers = Vec::new();
    for entry in entries.flatten() {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        let label = entry.file_name().to_string_lossy().into_owned();
        let found = ENVIRONMENT_PIP_CANDIDATES
            .iter()
            .map(|rel| dir.join(rel))
            .find(|candidate| is_executable(candidate));
        if let Some(manager_path) = found {
            managers.push(EnvironmentManager {
                label,
                manager_path,
            });
        }
    }
    managers
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn make_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn test_find_environment_managers_two_of_three() {
        let root = TempDir::new().unwrap();
        make_executable(&root.path().join("web/bin/pip3"));
        make_executable(&root.path().join("ml/bin/pip"));
        fs::create_dir_all(root.path().join("broken/bin")).unwrap();

        let mut managers = find_environment_managers(root.path());
        managers.sort_by(|a, b| a.label.cmp(&b.label));

        assert_eq!(managers.len(), 2);
        assert_eq!(managers[0].label, "ml");
        assert_eq!(managers[0].manager_path, root.path().join("ml/bin/pip"));
        assert_eq!(managers[1].label, "web");
        assert_eq!(managers[1].manager_path, root.path().join("web/bin/pip3"));
    }

    #[test]
    #[cfg(unix)]
    fn test_non_executable_pip_is_ignored() {
        let root = TempDir::new().unwrap();
        let pip = root.path().join("env/bin/pip3");
        fs::create_dir_all(pip.parent().unwrap()).unwrap();
        fs::write(&pip, "not executable").unwrap();

        assert!(find_environment_managers(root.path()).is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn test_pip3_preferred_over_pip() {
        let root = TempDir::new().unwrap();
        make_executable(&root.path().join("env/bin/pip"));
        make_executable(&root.path().join("env/bin/pip3"));

        let managers = find_environment_managers(root.path());
        assert_eq!(managers.len(), 1);
        assert!(managers[0].manager_path.ends_with("bin/pip3"));
    }

    #[test]
    fn test_missing_root_is_empty() {
        let root = TempDir::new().unwrap();
        assert!(find_environment_managers(&root.path().join("nope")).is_empty());
    }

    #[test]
    fn test_plain_files_in_root_are_skipped() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("notes.txt"), "x").unwrap();
        assert!(find_environment_managers(root.path()).is_empty());
    }

    #[test]
    fn test_detect_os_manager_falls_back_to_pkg() {
        let empty = TempDir::new().unwrap();
        let locator = ToolLocator::with_search_path(empty.path());
        let manager = detect_os_manager(&locator);
        assert_eq!(manager.kind, OsManagerKind::Pkg);
        assert_eq!(manager.program, "pkg");
    }

    #[test]
    #[cfg(unix)]
    fn test_detect_os_manager_follows_preference() {
        let bin = TempDir::new().unwrap();
        make_executable(&bin.path().join("pacman"));
        make_executable(&bin.path().join("apt"));

        let manager = detect_os_manager(&ToolLocator::with_search_path(bin.path()));
        assert_eq!(manager.kind, OsManagerKind::Apt);
        assert_eq!(manager.program, "apt");
    }

    #[test]
    fn test_find_system_pip_absent() {
        let empty = TempDir::new().unwrap();
        assert!(find_system_pip(&ToolLocator::with_search_path(empty.path())).is_none());
    }

    #[test]
    #[cfg(unix)]
    fn test_find_system_pip_falls_back_to_pip() {
        let bin = TempDir::new().unwrap();
        make_executable(&bin.path().join("pip"));
        let found = find_system_pip(&ToolLocator::with_search_path(bin.path())).unwrap();
        assert_eq!(found, bin.path().join("pip"));
    }

    #[test]
    fn test_configured_manager_by_path() {
        let manager = OsManager::from_program("/usr/bin/apt").unwrap();
        assert_eq!(manager.kind, OsManagerKind::Apt);
        assert_eq!(
            manager.list_command(),
            vec!["/usr/bin/apt", "list", "--installed"]
        );
    }

    #[test]
    fn test_configured_manager_unknown() {
        let err = OsManager::from_program("zypper").unwrap_err();
        assert!(matches!(err, Error::UnsupportedManager { .. }));
    }

    #[test]
    fn test_command_vocabulary() {
        let pkg = OsManager::new(OsManagerKind::Pkg, "pkg");
        assert_eq!(pkg.update_command(), vec!["pkg", "update", "-y"]);
        assert_eq!(pkg.upgrade_command(), vec!["pkg", "upgrade", "-y"]);
        assert_eq!(pkg.list_command(), vec!["pkg", "list-installed"]);

        let pacman = OsManager::new(OsManagerKind::Pacman, "pacman");
        assert_eq!(pacman.update_command(), vec!["pacman", "-Sy", "--noconfirm"]);
        assert_eq!(pacman.list_command(), vec!["pacman", "-Q"]);

        let apk = OsManager::new(OsManagerKind::Apk, "apk");
        assert_eq!(apk.upgrade_command(), vec!["apk", "upgrade", "--no-interactive"]);
    }
}
