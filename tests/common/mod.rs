//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new();
//!     let runner = ScriptedRunner::new().reply(&["pkg", "update"], 100, "", "E: broken");
//!     // ... test code
//! }
//! ```

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use aktualizator::process::{CommandOutput, CommandRunner};
use assert_fs::prelude::*;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{ScriptedRunner, TestFixture};
}

/// Canned command output for the tests.
#[allow(dead_code)]
pub mod outputs {
    /// apt refusing an unsigned repository.
    pub const UNSIGNED_RELEASE: &str =
        "E: The repository 'https://bad.example.com/termux-main stable InRelease' is not signed.";

    /// A short `pkg list-installed` listing.
    pub const PKG_LISTING: &str = "Listing...\n\
        bash/stable,now 5.2.15-1 aarch64 [installed]\n\
        python-3.11.7\n\
        zlib\n";

    pub const PIP_JSON: &str = r#"[{"name": "pip", "version": "24.0"}, {"name": "rich", "version": "13.7.0"}]"#;
}

/// A runner that replies by command prefix and records every call.
#[allow(dead_code)]
pub struct ScriptedRunner {
    replies: Vec<(Vec<String>, CommandOutput)>,
    calls: RefCell<Vec<(Vec<String>, bool)>>,
}

#[allow(dead_code)]
impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            replies: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Reply to any command starting with `prefix`. First match wins;
    /// unmatched commands succeed with no output.
    pub fn reply(mut self, prefix: &[&str], exit_code: i32, stdout: &str, stderr: &str) -> Self {
        self.replies.push((
            prefix.iter().map(|s| s.to_string()).collect(),
            CommandOutput {
                exit_code,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        ));
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn all_simulated(&self) -> bool {
        self.calls.borrow().iter().all(|(_, simulate)| *simulate)
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &[String], simulate: bool) -> CommandOutput {
        self.calls.borrow_mut().push((command.to_vec(), simulate));
        if simulate {
            return CommandOutput::simulated(command);
        }
        self.replies
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix))
            .map(|(_, output)| output.clone())
            .unwrap_or(CommandOutput {
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
            })
    }
}

/// A temporary home with helpers for virtualenvs and source lists.
#[allow(dead_code)]
pub struct TestFixture {
    pub temp: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp: assert_fs::TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn venv_root(&self) -> PathBuf {
        self.path().join("venv")
    }

    /// An empty directory usable as a search path with no tools on it.
    pub fn empty_bin(&self) -> PathBuf {
        let dir = self.temp.child("empty-bin");
        dir.create_dir_all().unwrap();
        dir.path().to_path_buf()
    }

    /// Create an executable pip at `venv/<label>/bin/pip3`.
    #[cfg(unix)]
    pub fn with_environment(self, label: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;
        let pip = self.temp.child(format!("venv/{}/bin/pip3", label));
        pip.write_str("#!/bin/sh\n").unwrap();
        std::fs::set_permissions(pip.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
        self
    }

    pub fn with_sources(self, content: &str) -> Self {
        self.temp.child("etc/apt/sources.list").write_str(content).unwrap();
        self
    }

    pub fn sources_path(&self) -> PathBuf {
        self.path().join("etc/apt/sources.list")
    }

    pub fn out(&self, name: &str) -> PathBuf {
        self.path().join("out").join(name)
    }
}
