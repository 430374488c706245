//! # Source List Sanitizing
//!
//! Disables apt source entries that point at mirrors known to be broken.
//!
//! For each configured source file, every active line mentioning a faulty
//! host is replaced by an explanatory comment and the commented-out original:
//!
//! ```text
//! # aktualizator: disabled faulty mirror bad.example.com
//! # deb https://bad.example.com/termux-main stable main
//! ```
//!
//! Lines that are already comments are never touched, which makes
//! sanitizing idempotent. Before a file is rewritten it is copied to
//! `<file>.bak`. A problem with one file is logged and the remaining files
//! are still processed.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::model::SourceEdit;

/// Prefix of the comment line inserted above a disabled entry.
pub const DISABLED_NOTE: &str = "# aktualizator: disabled faulty mirror";

/// Rewrite source text, returning the new text and the disabled lines.
///
/// Line endings are kept as found, so CRLF files stay CRLF. Returns `None`
/// when nothing had to change.
pub fn sanitize_text(text: &str, bad_hosts: &BTreeSet<String>) -> Option<(String, Vec<(String, String)>)> {
    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let mut disabled = Vec::new();
    let mut rewritten = String::with_capacity(text.len());

    for chunk in text.split_inclusive('\n') {
        let (line, ending) = split_line_ending(chunk);
        if line.trim_start().starts_with('#') {
            rewritten.push_str(chunk);
            continue;
        }
        match bad_hosts.iter().find(|host| line.contains(host.as_str())) {
            Some(host) => {
                rewritten.push_str(&format!("{} {}{}", DISABLED_NOTE, host, newline));
                rewritten.push_str(&format!("# {}{}", line, ending));
                disabled.push((line.to_string(), host.clone()));
            }
            None => rewritten.push_str(chunk),
        }
    }

    if disabled.is_empty() {
        return None;
    }
    Some((rewritten, disabled))
}

/// Split a line into its content and its terminator (`""`, `"\n"` or `"\r\n"`).
fn split_line_ending(chunk: &str) -> (&str, &str) {
    if let Some(line) = chunk.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = chunk.strip_suffix('\n') {
        (line, "\n")
    } else {
        (chunk, "")
    }
}

/// Path of the backup copy made before `file` is rewritten.
pub fn backup_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Comment out every source line that mentions one of `bad_hosts`.
pub fn sanitize(files: &[PathBuf], bad_hosts: &BTreeSet<String>) -> Vec<SourceEdit> {
    let mut edits = Vec::new();
    if bad_hosts.is_empty() {
        return edits;
    }

    for file in files {
        if !file.is_file() {
            debug!("Source file {} not present, skipping", file.display());
            continue;
        }
        let text = match fs::read_to_string(file) {
            Ok(text) => text,
            Err(e) => {
                warn!("Cannot read source file {}: {}", file.display(), e);
                continue;
            }
        };
        let Some((rewritten, disabled)) = sanitize_text(&text, bad_hosts) else {
            continue;
        };

        let backup = backup_path(file);
        if let Err(e) = fs::copy(file, &backup) {
            warn!("Cannot back up {} to {}: {}", file.display(), backup.display(), e);
        }
        if let Err(e) = fs::write(file, rewritten) {
            warn!("Cannot write source file {}: {}", file.display(), e);
            continue;
        }

        info!("Disabled {} line(s) in {}", disabled.len(), file.display());
        edits.extend(disabled.into_iter().map(|(original_line, host)| SourceEdit {
            file: file.clone(),
            original_line,
            host,
        }));
    }
    edits
}
