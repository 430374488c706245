//! pip layer, used for the system pip and for every virtualenv.
//!
//! Listing distinguishes two failure modes: `pip_exec` when pip itself
//! failed, and `pip_list_parse` when pip succeeded but printed something that
//! is not the expected JSON (typically an old pip without `--format=json`).

use std::path::Path;

use log::{debug, info};

use crate::model::{Issue, IssueCategory, PackageRecord};
use crate::parse::{excerpt, parse_pip_json};
use crate::process::CommandRunner;

/// How much raw output to embed in a `pip_list_parse` issue.
const RAW_EXCERPT_CHARS: usize = 200;

fn pip_program(pip: &Path) -> String {
    pip.to_string_lossy().into_owned()
}

/// `pip list --format=json` for the given pip.
pub fn list_command(pip: &Path) -> Vec<String> {
    vec![pip_program(pip), "list".to_string(), "--format=json".to_string()]
}

/// List installed packages.
///
/// Returns the packages and at most one issue. A simulated run returns an
/// empty list and no issue.
pub fn list(runner: &dyn CommandRunner, pip: &Path, simulate: bool) -> (Vec<PackageRecord>, Option<Issue>) {
    let cmd = list_command(pip);
    let output = runner.run(&cmd, simulate);

    if output.is_failure() {
        let issue = Issue::new(IssueCategory::PipExec, cmd, output.exit_code, output.stderr);
        return (Vec::new(), Some(issue));
    }
    if simulate {
        return (Vec::new(), None);
    }

    match parse_pip_json(&output.stdout) {
        Ok(packages) => {
            debug!("{} lists {} packages", pip.display(), packages.len());
            (packages, None)
        }
        Err(e) => {
            let stderr = format!(
                "parse error: {}; raw:{}",
                e,
                excerpt(&output.stdout, RAW_EXCERPT_CHARS)
            );
            let issue = Issue::new(IssueCategory::PipListParse, cmd, output.exit_code, stderr);
            (Vec::new(), Some(issue))
        }
    }
}

/// Upgrade every installed package with one batched `pip install --upgrade`.
///
/// Never runs when simulating. Re-lists first; an empty listing is a no-op.
/// A failing batch is reported as a single `pip_upgrade` issue.
pub fn upgrade(runner: &dyn CommandRunner, pip: &Path, simulate: bool) -> Option<Issue> {
    if simulate {
        return None;
    }

    let (packages, issue) = list(runner, pip, false);
    if issue.is_some() {
        return issue;
    }
    if packages.is_empty() {
        debug!("Nothing to upgrade for {}", pip.display());
        return None;
    }

    let mut cmd = vec![pip_program(pip), "install".to_string(), "--upgrade".to_string()];
    cmd.extend(packages.into_iter().map(|p| p.name));

    info!("Upgrading {} packages with {}", cmd.len() - 3, pip.display());
    let output = runner.run(&cmd, false);
    (output.exit_code != 0)
        .then(|| Issue::new(IssueCategory::PipUpgrade, cmd, output.exit_code, output.stderr))
}
