//! OS package-manager layer: update, upgrade, then list installed packages.

use log::{debug, info};

use super::LayerReport;
use crate::detect::OsManager;
use crate::model::{Issue, IssueCategory};
use crate::parse::parse_installed_listing;
use crate::process::{CommandOutput, CommandRunner};

/// Refresh the package index.
pub fn update(runner: &dyn CommandRunner, manager: &OsManager, simulate: bool) -> (Vec<String>, CommandOutput) {
    let cmd = manager.update_command();
    let output = runner.run(&cmd, simulate);
    (cmd, output)
}

/// Upgrade installed packages.
pub fn upgrade(runner: &dyn CommandRunner, manager: &OsManager, simulate: bool) -> (Vec<String>, CommandOutput) {
    let cmd = manager.upgrade_command();
    let output = runner.run(&cmd, simulate);
    (cmd, output)
}

/// An issue for `output` if it is a real failure.
pub(crate) fn failure_issue(category: IssueCategory, cmd: Vec<String>, output: &CommandOutput) -> Option<Issue> {
    output
        .is_failure()
        .then(|| Issue::new(category, cmd, output.exit_code, output.stderr.clone()))
}

/// Update, upgrade and list the OS layer.
///
/// Listing output is only parsed for real runs; a simulated run yields no
/// packages.
pub fn collect(runner: &dyn CommandRunner, manager: &OsManager, simulate: bool) -> LayerReport {
    let mut report = LayerReport::default();

    info!("Updating package index with {}", manager);
    let (cmd, output) = update(runner, manager, simulate);
    report
        .issues
        .extend(failure_issue(IssueCategory::PkgUpdate, cmd, &output));

    info!("Upgrading packages with {}", manager);
    let (cmd, output) = upgrade(runner, manager, simulate);
    report
        .issues
        .extend(failure_issue(IssueCategory::PkgUpgrade, cmd, &output));

    let cmd = manager.list_command();
    let output = runner.run(&cmd, simulate);
    if output.is_failure() {
        report
            .issues
            .push(Issue::new(IssueCategory::PkgList, cmd, output.exit_code, output.stderr));
    } else if !simulate {
        report.packages = parse_installed_listing(&output.stdout);
        debug!("Parsed {} OS packages", report.packages.len());
    }

    report
}
