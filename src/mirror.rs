//! # Mirror Fault Analysis
//!
//! When `pkg update` fails because a mirror's Release file is unsigned or
//! signed with a missing or expired key, apt prints lines such as:
//!
//! ```text
//! E: The repository 'https://mirror.example.org/termux stable InRelease' is not signed.
//! W: GPG error: https://mirror.example.org/termux stable InRelease: ... NO_PUBKEY 5A897D96E57CF20C
//! ```
//!
//! [`detect_faulty_hosts`] picks the host names out of such lines. A line is
//! only considered when it names a repository URL, refers to release
//! metadata and carries one of the known signature failure markers. Anything
//! else is ignored so that unrelated errors never disable a healthy mirror.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// Signature failure markers apt prints for a broken mirror.
pub const FAILURE_MARKERS: [&str; 5] = [
    "is not signed",
    "NO_PUBKEY",
    "public key is not available",
    "EXPKEYSIG",
    "KEYEXPIRED",
];

/// Release metadata file names.
const RELEASE_MARKERS: [&str; 2] = ["InRelease", "Release"];

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"https?://[^\s'"]+"#).expect("static regex is valid"))
}

/// Whether `line` reports a signature failure for a repository's release file.
pub fn is_mirror_fault_line(line: &str) -> bool {
    url_pattern().is_match(line)
        && RELEASE_MARKERS.iter().any(|m| line.contains(m))
        && FAILURE_MARKERS.iter().any(|m| line.contains(m))
}

/// Host of the first URL on `line`, if any.
pub fn first_url_host(line: &str) -> Option<String> {
    let found = url_pattern().find(line)?;
    let parsed = Url::parse(found.as_str()).ok()?;
    parsed.host_str().map(str::to_string)
}

/// Host names of mirrors that failed signature checks, sorted and deduplicated.
pub fn detect_faulty_hosts(text: &str) -> BTreeSet<String> {
    text.lines()
        .filter(|line| is_mirror_fault_line(line))
        .filter_map(first_url_host)
        .collect()
}
