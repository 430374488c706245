//! # Aggregation
//!
//! Drives every layer selected by the [`Mode`](crate::model::Mode) and folds
//! the results into one [`Inventory`] plus the list of [`Issue`]s.
//!
//! ## Layers by mode
//!
//! | mode | OS | system pip | environments | upgrades |
//! |------|----|------------|--------------|----------|
//! | A    | x  |            |              |          |
//! | B    | x  | x          |              |          |
//! | C    | x  | x          | x            |          |
//! | D    | x  | x          | x            | x        |
//!
//! Aggregation never fails: whatever goes wrong is recorded as an issue and
//! the inventory is returned with the layers that could be listed.

use log::{debug, info};

use crate::config::RunConfig;
use crate::detect::{find_environment_managers, find_system_pip, resolve_os_manager, EnvironmentManager};
use crate::layers::{os, pip};
use crate::model::{EnvironmentInventory, Inventory, Issue, IssueCategory};
use crate::process::{command, CommandRunner, SPAWN_FAILURE_EXIT};

/// Exit code recorded when the system pip cannot be found.
const PIP_MISSING_EXIT: i32 = 127;

/// The result of a run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub inventory: Inventory,
    pub issues: Vec<Issue>,
}

impl RunOutcome {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

pub struct Aggregator<'a> {
    config: &'a RunConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> Aggregator<'a> {
    pub fn new(config: &'a RunConfig, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    pub fn run(&self) -> RunOutcome {
        let config = self.config;
        let mut inventory = Inventory::empty(config.mode, config.host.clone());
        let mut issues = Vec::new();

        info!("Collecting inventory in mode {}", config.mode);
        self.collect_os(&mut inventory, &mut issues);

        let system_pip = if config.mode.includes_system_pip() {
            self.collect_system_pip(&mut inventory, &mut issues)
        } else {
            None
        };

        let environments = if config.mode.includes_environments() {
            self.collect_environments(&mut inventory, &mut issues)
        } else {
            Vec::new()
        };

        if config.mode.upgrades() && !config.simulate {
            if let Some(pip_path) = &system_pip {
                issues.extend(pip::upgrade(self.runner, pip_path, false));
            }
            for env in &environments {
                info!("Upgrading environment {}", env.label);
                issues.extend(
                    pip::upgrade(self.runner, &env.manager_path, false)
                        .map(|issue| issue.in_environment(env.label.clone())),
                );
            }
        }

        info!(
            "Inventory: {} OS, {} system pip, {} environments; {} issues",
            inventory.os_packages.len(),
            inventory.system_language_packages.len(),
            inventory.environments.len(),
            issues.len()
        );
        RunOutcome { inventory, issues }
    }

    fn collect_os(&self, inventory: &mut Inventory, issues: &mut Vec<Issue>) {
        let manager = match resolve_os_manager(&self.config.locator, self.config.os_manager.as_deref()) {
            Ok(manager) => manager,
            Err(e) => {
                let program = self.config.os_manager.clone().unwrap_or_default();
                issues.push(Issue::new(
                    IssueCategory::PkgException,
                    vec![program],
                    SPAWN_FAILURE_EXIT,
                    e.to_string(),
                ));
                return;
            }
        };

        debug!("Using OS package manager {}", manager);
        let report = os::collect(self.runner, &manager, self.config.simulate);
        inventory.os_packages = report.packages;
        issues.extend(report.issues);
    }

    fn collect_system_pip(&self, inventory: &mut Inventory, issues: &mut Vec<Issue>) -> Option<std::path::PathBuf> {
        let Some(pip_path) = find_system_pip(&self.config.locator) else {
            issues.push(Issue::new(
                IssueCategory::SystemPipMissing,
                command(&["which", "pip3"]),
                PIP_MISSING_EXIT,
                "system pip not found",
            ));
            return None;
        };

        info!("Listing system packages with {}", pip_path.display());
        let (packages, issue) = pip::list(self.runner, &pip_path, self.config.simulate);
        inventory.system_language_packages = packages;
        issues.extend(issue);
        Some(pip_path)
    }

    fn collect_environments(&self, inventory: &mut Inventory, issues: &mut Vec<Issue>) -> Vec<EnvironmentManager> {
        let environments = find_environment_managers(&self.config.venv_root);
        debug!(
            "Found {} environments under {}",
            environments.len(),
            self.config.venv_root.display()
        );

        for env in &environments {
            info!("Listing environment {}", env.label);
            let (packages, issue) = pip::list(self.runner, &env.manager_path, self.config.simulate);
            issues.extend(issue.map(|i| i.in_environment(env.label.clone())));
            inventory.environments.insert(
                env.label.clone(),
                EnvironmentInventory {
                    manager_path: env.manager_path.clone(),
                    packages,
                },
            );
        }
        environments
    }
}
