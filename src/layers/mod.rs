//! # Layer Inventory Collectors
//!
//! A run inventories up to three nested layers of packages:
//!
//! 1. **OS layer** ([`os`]): the host package manager (`pkg`, `apt`, `apk`,
//!    `pacman`). Refreshed and upgraded before listing.
//! 2. **System pip** ([`pip`]): the pip found on `PATH`.
//! 3. **Environments** ([`pip`] again): one pip per virtualenv.
//!
//! Every collector returns its packages together with the [`Issue`]s it ran
//! into. Collectors never fail: a broken layer yields an empty package list
//! and at least one issue, so the rest of the run can proceed.

pub mod os;
pub mod pip;

use crate::model::{Issue, PackageRecord};

/// Packages and issues gathered from one layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerReport {
    pub packages: Vec<PackageRecord>,
    pub issues: Vec<Issue>,
}

impl LayerReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}
