//! # Run Guard
//!
//! Only one run may touch package managers, source lists and caches at a
//! time. [`RunGuard`] holds an exclusive advisory lock (`flock`) on a fixed
//! lock file for as long as it lives; a second process blocks in
//! [`RunGuard::acquire`] until the first one releases.
//!
//! The lock file is created if missing and never truncated or deleted.
//! Unlinking a lock file that another process still holds would let a third
//! process lock a fresh file at the same path.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use log::debug;

use crate::error::{Error, Result};

/// An acquired run lock, released on drop.
#[derive(Debug)]
pub struct RunGuard {
    file: Option<File>,
    path: PathBuf,
}

impl RunGuard {
    /// Block until the exclusive lock on `path` is held.
    pub fn acquire(path: &Path) -> Result<Self> {
        let lock_error = |e: std::io::Error| Error::Lock {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(lock_error)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(lock_error)?;
        file.lock_exclusive().map_err(lock_error)?;

        debug!("Acquired process lock {}", path.display());
        Ok(Self {
            file: Some(file),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// Release the lock. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = FileExt::unlock(&file) {
                debug!("Unlocking {} failed: {}", self.path.display(), e);
            }
            debug!("Released lock {}", self.path.display());
        }
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.release();
    }
}
