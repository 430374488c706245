//! # Listing Parsers
//!
//! Pure functions that turn package-manager output into [`PackageRecord`]s.
//!
//! The OS listing heuristic is deliberately permissive: OS managers print
//! packages in several shapes (`name/suite version arch [installed]`,
//! `name-1.2.3-r0`, `name version`) and we prefer an imprecise record over
//! dropping a package. The original line is kept in `raw` so nothing is lost.
//!
//! pip output is structured (`pip list --format=json`) and parsed strictly;
//! decoding errors are reported to the caller, who turns them into a
//! `pip_list_parse` issue.

use serde::Deserialize;

use crate::model::{PackageRecord, UNKNOWN_VERSION};

/// Lines some managers print before the actual listing.
const BANNER_PREFIXES: [&str; 2] = ["Listing...", "WARNING:"];

/// Parse one line of OS package listing output.
///
/// Returns `None` for blank lines and listing banners.
pub fn parse_installed_line(line: &str) -> Option<PackageRecord> {
    let line = line.trim();
    if line.is_empty() || BANNER_PREFIXES.iter().any(|b| line.starts_with(b)) {
        return None;
    }
    let token = line.split_whitespace().next()?;
    let (name, version) = split_token(token);
    Some(PackageRecord::new(name, version).with_raw(line))
}

/// Parse a whole listing, skipping lines that carry no package.
pub fn parse_installed_listing(output: &str) -> Vec<PackageRecord> {
    output.lines().filter_map(parse_installed_line).collect()
}

fn split_token(token: &str) -> (&str, &str) {
    if let Some((name, _)) = token.split_once('/') {
        if !name.is_empty() {
            return (name, UNKNOWN_VERSION);
        }
        return (token, UNKNOWN_VERSION);
    }
    if let Some((name, version)) = token.rsplit_once('-') {
        if !name.is_empty() && !version.is_empty() {
            return (name, version);
        }
    }
    (token, UNKNOWN_VERSION)
}

#[derive(Debug, Deserialize)]
struct PipEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

/// Decode `pip list --format=json` output.
///
/// Entries without a name are dropped; a missing version becomes `unknown`.
pub fn parse_pip_json(output: &str) -> serde_json::Result<Vec<PackageRecord>> {
    let entries: Vec<PipEntry> = serde_json::from_str(output)?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            let name = entry.name.filter(|n| !n.trim().is_empty())?;
            let version = entry
                .version
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_VERSION.to_string());
            Some(PackageRecord::new(name, version))
        })
        .collect())
}

/// First `limit` characters of `text`, for embedding raw output in issues.
pub fn excerpt(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
