//! # Error Suggestions
//!
//! Helpers that turn fatal errors into messages saying what went wrong and
//! how to fix it.

use std::path::Path;

use crate::detect::OS_MANAGER_PREFERENCE;

/// Generate an error for a run lock that could not be obtained.
pub fn lock_unavailable(path: &Path, error: crate::error::Error) -> anyhow::Error {
    anyhow::Error::new(error).context(format!(
        "Another run may be active, or {path} is not writable\n\n\
         hint: Use --lock-file <PATH> to place the lock somewhere writable\n\
         hint: Use --no-lock to skip locking when no other run can start",
        path = path.display()
    ))
}

/// Generate an error for an output document that could not be written.
pub fn output_unwritable(path: &Path, error: crate::error::Error) -> anyhow::Error {
    anyhow::Error::new(error).context(format!(
        "Could not save {path}\n\n\
         hint: Run 'termux-setup-storage' to grant access to shared storage\n\
         hint: Use --out-inventory, --out-issues or --out-repair to choose another location",
        path = path.display()
    ))
}

/// The hint appended to unsupported package manager warnings.
pub fn supported_managers() -> String {
    format!("hint: Supported package managers are: {}", OS_MANAGER_PREFERENCE.join(", "))
}
