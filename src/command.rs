//! External command execution with captured output and a hard timeout.
//!
//! Every interaction with the host licensing subsystem goes through the
//! [`CommandRunner`] trait, so the trial loop can be driven by a scripted
//! double in tests instead of shelling out to real OS utilities.
//!
//! A step that times out or fails to spawn is converted into a sentinel
//! [`CommandResult`] rather than an error: one misbehaving command must
//! never abort the run, the loop just moves on.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

/// Exit code reported for commands that never produced one
/// (timeout or spawn failure).
pub const SENTINEL_EXIT_CODE: i32 = -1;

/// Captured outcome of one external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    /// Whether the command exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Result representing a command that exceeded its timeout.
    pub fn timed_out() -> Self {
        Self {
            exit_code: SENTINEL_EXIT_CODE,
            stdout: String::new(),
            stderr: "TIMEOUT".to_string(),
        }
    }

    /// Result representing a command that could not be started.
    pub fn spawn_failed(err: &std::io::Error) -> Self {
        Self {
            exit_code: SENTINEL_EXIT_CODE,
            stdout: String::new(),
            stderr: err.to_string(),
        }
    }

    /// Best available detail text: stdout if non-empty, otherwise stderr.
    pub fn detail(&self) -> &str {
        if self.stdout.is_empty() {
            &self.stderr
        } else {
            &self.stdout
        }
    }
}

/// Capability to run an external command line.
///
/// `argv` is the full command line, program first. Implementations must
/// return a sentinel [`CommandResult`] on timeout or spawn failure instead
/// of panicking or propagating an error.
pub trait CommandRunner {
    fn run(&self, argv: &[String], limit: Duration)
        -> impl Future<Output = CommandResult> + Send;
}

/// [`CommandRunner`] backed by real OS processes.
///
/// The child is spawned with piped stdout/stderr and killed if it is still
/// running when the timeout elapses.
#[derive(Debug, Default, Clone)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        argv: &[String],
        limit: Duration,
    ) -> impl Future<Output = CommandResult> + Send {
        async move {
            let Some((program, args)) = argv.split_first() else {
                return CommandResult {
                    exit_code: SENTINEL_EXIT_CODE,
                    stdout: String::new(),
                    stderr: "empty command line".to_string(),
                };
            };

            let child = Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn();

            let child = match child {
                Ok(child) => child,
                Err(err) => return CommandResult::spawn_failed(&err),
            };

            // Dropping the wait future on timeout kills the child
            // via kill_on_drop.
            match timeout(limit, child.wait_with_output()).await {
                Ok(Ok(output)) => CommandResult {
                    exit_code: output.status.code().unwrap_or(SENTINEL_EXIT_CODE),
                    stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                },
                Ok(Err(err)) => CommandResult::spawn_failed(&err),
                Err(_) => CommandResult::timed_out(),
            }
        }
    }
}
