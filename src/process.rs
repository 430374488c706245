//! # Process Execution
//!
//! Every external command this crate runs goes through the [`CommandRunner`]
//! trait. The trait exists so the orchestration code can be driven by a
//! scripted runner in tests; the real implementation is [`SystemRunner`].
//!
//! ## Contract
//!
//! `run` is total: it never panics and never returns an error. Failures are
//! folded into the exit code:
//!
//! - simulate mode: no process is spawned, the exit code is
//!   [`SIMULATED_EXIT`] (`-1`) and stdout echoes the command,
//! - executable not found: [`NOT_FOUND_EXIT`] (`127`),
//! - any other spawn failure or a signal-terminated process:
//!   [`SPAWN_FAILURE_EXIT`] (`255`).
//!
//! Callers must test failure with [`CommandOutput::is_failure`], which treats
//! the simulate sentinel as success. Checking `exit_code != 0` is wrong.

use std::io::ErrorKind;
use std::process::Command;

use log::{debug, warn};

/// Exit code returned for simulated commands.
pub const SIMULATED_EXIT: i32 = -1;
/// Exit code returned when the executable cannot be located.
pub const NOT_FOUND_EXIT: i32 = 127;
/// Exit code returned for any other failure to run the process.
pub const SPAWN_FAILURE_EXIT: i32 = 255;

/// Captured result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// The sentinel result of a simulated command.
    pub fn simulated(command: &[String]) -> Self {
        Self {
            exit_code: SIMULATED_EXIT,
            stdout: format!("[dry-run] {}", command.join(" ")),
            stderr: String::new(),
        }
    }

    /// Whether this is a real failure (anything but `0` or the simulate sentinel).
    pub fn is_failure(&self) -> bool {
        self.exit_code != 0 && self.exit_code != SIMULATED_EXIT
    }

    pub fn is_simulated(&self) -> bool {
        self.exit_code == SIMULATED_EXIT
    }
}

/// Runs external commands.
pub trait CommandRunner {
    /// Run `command` (program followed by its arguments).
    ///
    /// With `simulate` set, implementations must not spawn anything and must
    /// return [`CommandOutput::simulated`].
    fn run(&self, command: &[String], simulate: bool) -> CommandOutput;
}

/// Runs commands on the host with `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &[String], simulate: bool) -> CommandOutput {
        debug!("Run cmd: {} (dry_run={})", command.join(" "), simulate);
        if simulate {
            return CommandOutput::simulated(command);
        }

        let Some((program, args)) = command.split_first() else {
            return CommandOutput {
                exit_code: NOT_FOUND_EXIT,
                stdout: String::new(),
                stderr: "empty command".to_string(),
            };
        };

        match Command::new(program).args(args).output() {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let mut stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                let exit_code = match output.status.code() {
                    Some(code) => code,
                    None => {
                        if !stderr.is_empty() && !stderr.ends_with('\n') {
                            stderr.push('\n');
                        }
                        stderr.push_str(&format!("{} terminated by signal", program));
                        SPAWN_FAILURE_EXIT
                    }
                };
                debug!(
                    "Cmd rc={} out={} bytes err={} bytes",
                    exit_code,
                    stdout.len(),
                    stderr.len()
                );
                CommandOutput {
                    exit_code,
                    stdout,
                    stderr,
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Command not found: {}", program);
                CommandOutput {
                    exit_code: NOT_FOUND_EXIT,
                    stdout: String::new(),
                    stderr: format!("command not found: {}: {}", program, e),
                }
            }
            Err(e) => {
                warn!("Unexpected error running {}: {}", command.join(" "), e);
                CommandOutput {
                    exit_code: SPAWN_FAILURE_EXIT,
                    stdout: String::new(),
                    stderr: e.to_string(),
                }
            }
        }
    }
}

/// Build an owned command vector from string slices.
pub fn command<S: AsRef<str>>(parts: &[S]) -> Vec<String> {
    parts.iter().map(|p| p.as_ref().to_string()).collect()
}

#[cfg(test)]
pub(crate) mod testing {
    //! A runner that replies from a script and records every call.

    use super::*;
    use std::cell::RefCell;

    pub(crate) struct ScriptedRunner {
        replies: Vec<(Vec<String>, CommandOutput)>,
        calls: RefCell<Vec<(Vec<String>, bool)>>,
    }

    impl ScriptedRunner {
        pub(crate) fn new() -> Self {
            Self {
                replies: Vec::new(),
                calls: RefCell::new(Vec::new()),
            }
        }

        /// Reply to any command starting with `prefix`. First match wins.
        pub(crate) fn reply(mut self, prefix: &[&str], exit_code: i32, stdout: &str, stderr: &str) -> Self {
            self.replies.push((
                command(prefix),
                CommandOutput {
                    exit_code,
                    stdout: stdout.to_string(),
                    stderr: stderr.to_string(),
                },
            ));
            self
        }

        pub(crate) fn calls(&self) -> Vec<Vec<String>> {
            self.calls.borrow().iter().map(|(c, _)| c.clone()).collect()
        }

        pub(crate) fn simulate_flags(&self) -> Vec<bool> {
            self.calls.borrow().iter().map(|(_, s)| *s).collect()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, command: &[String], simulate: bool) -> CommandOutput {
            self.calls.borrow_mut().push((command.to_vec(), simulate));
            if simulate {
                return CommandOutput::simulated(command);
            }
            self.replies
                .iter()
                .find(|(prefix, _)| command.starts_with(prefix))
                .map(|(_, output)| output.clone())
                .unwrap_or(CommandOutput {
                    exit_code: 0,
                    stdout: String::new(),
                    stderr: String::new(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_returns_sentinel() {
        let output = SystemRunner.run(&command(&["pkg", "update", "-y"]), true);
        assert_eq!(output.exit_code, SIMULATED_EXIT);
        assert_eq!(output.stdout, "[dry-run] pkg update -y");
        assert!(output.stderr.is_empty());
        assert!(output.is_simulated());
        assert!(!output.is_failure());
    }

    #[test]
    fn test_simulate_never_spawns_missing_program() {
        let output = SystemRunner.run(&command(&["definitely-not-a-real-binary-xyz"]), true);
        assert_eq!(output.exit_code, SIMULATED_EXIT);
    }

    #[test]
    fn test_missing_executable_is_127() {
        let output = SystemRunner.run(&command(&["definitely-not-a-real-binary-xyz", "--help"]), false);
        assert_eq!(output.exit_code, NOT_FOUND_EXIT);
        assert!(output.stdout.is_empty());
        assert!(output.stderr.contains("definitely-not-a-real-binary-xyz"));
        assert!(output.is_failure());
    }

    #[test]
    fn test_empty_command_is_not_found() {
        let output = SystemRunner.run(&[], false);
        assert_eq!(output.exit_code, NOT_FOUND_EXIT);
    }

    #[test]
    #[cfg(unix)]
    fn test_captures_exit_code_and_streams() {
        let output = SystemRunner.run(
            &command(&["sh", "-c", "echo out; echo err >&2; exit 3"]),
            false,
        );
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert!(output.is_failure());
    }

    #[test]
    #[cfg(unix)]
    fn test_signal_termination_is_255() {
        let output = SystemRunner.run(&command(&["sh", "-c", "kill -9 $$"]), false);
        assert_eq!(output.exit_code, SPAWN_FAILURE_EXIT);
        assert!(output.stderr.contains("terminated by signal"));
    }

    #[test]
    #[cfg(unix)]
    fn test_unexecutable_file_is_255() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        let script = temp.path().join("not-executable");
        std::fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o644)).unwrap();

        let output = SystemRunner.run(&[script.display().to_string()], false);

        assert_eq!(output.exit_code, SPAWN_FAILURE_EXIT);
        assert!(!output.stderr.is_empty());
        assert!(output.stdout.is_empty());
    }

    #[test]
    fn test_is_failure_ignores_zero_and_sentinel() {
        let ok = CommandOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(!ok.is_failure());
        assert!(!CommandOutput::simulated(&command(&["x"])).is_failure());
        let failed = CommandOutput { exit_code: 1, ..ok };
        assert!(failed.is_failure());
    }
}
