//! # Terminal Output
//!
//! Colour control and the human-readable summaries printed after a run.
//!
//! ## Respecting User Preferences
//!
//! Colour follows the `--color=never|always|auto` flag. In auto mode it is
//! turned off by:
//! - `NO_COLOR` (any value, including empty)
//! - `CLICOLOR=0`
//! - `TERM=dumb`
//! - stdout not being a terminal, unless `CLICOLOR_FORCE=1`
//!
//! The JSON documents are the real output of a run; the summaries only point
//! at what needs attention.

use std::env;
use std::fmt::Write as _;

use console::style;
use log::warn;

use crate::model::{Issue, IssueCategory, RepairResult};
use crate::suggestions;

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and the `--color` flag.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };
        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    /// Apply the decision to the `console` crate, which styles our output.
    pub fn apply(&self) {
        console::set_colors_enabled(self.use_color);
        console::set_colors_enabled_stderr(self.use_color);
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns `symbol` when colours are on, otherwise `plain`.
pub fn emoji<'a>(config: &OutputConfig, symbol: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        symbol
    } else {
        plain
    }
}

/// Log every issue at `warn` as one line of JSON.
pub fn log_issues(issues: &[Issue]) {
    for issue in issues {
        match serde_json::to_string(issue) {
            Ok(line) => warn!("issue {}", line),
            Err(_) => warn!("issue {} ({})", issue.category, issue.command.join(" ")),
        }
    }
}

fn paint(config: &OutputConfig, text: &str, ok: bool) -> String {
    match (config.use_color, ok) {
        (false, _) => text.to_string(),
        (true, true) => style(text).green().to_string(),
        (true, false) => style(text).yellow().bold().to_string(),
    }
}

/// Summarize the issues of a run, one line per issue.
pub fn render_issue_summary(config: &OutputConfig, issues: &[Issue]) -> String {
    let mut out = String::new();
    if issues.is_empty() {
        let _ = writeln!(
            out,
            "{} {}",
            emoji(config, "✅", "[OK]"),
            paint(config, "No issues found", true)
        );
        return out;
    }

    let _ = writeln!(
        out,
        "{} {}",
        emoji(config, "⚠️", "[WARN]"),
        paint(config, &format!("{} issue(s) found", issues.len()), false)
    );
    for issue in issues {
        let scope = issue
            .environment_label
            .as_deref()
            .map(|label| format!(" [{}]", label))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "   {}{}: {} (exit {})",
            issue.category,
            scope,
            issue.command.join(" "),
            issue.exit_code
        );
    }
    if issues.iter().any(|i| i.category == IssueCategory::PkgException) {
        let _ = writeln!(out, "   {}", suggestions::supported_managers());
    }
    out
}

/// Summarize a repair pass, one line per step.
pub fn render_repair_summary(config: &OutputConfig, result: &RepairResult) -> String {
    let warnings = result
        .steps
        .iter()
        .filter(|s| s.starts_with("warning:"))
        .count();

    let mut out = String::new();
    let heading = format!("Repair finished with {} warning(s)", warnings);
    let _ = writeln!(
        out,
        "{} {}",
        emoji(config, "🔧", "[REPAIR]"),
        paint(config, &heading, warnings == 0)
    );
    for step in &result.steps {
        let _ = writeln!(out, "   {}", step);
    }
    out
}
