use std::io::{self, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

mod sealed {
    use std::process::Command;
    pub trait Sealed {}
    impl Sealed for Command {}
}

/// Bound used by [`SystemCommandRunner::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Errors encountered when running an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command could not be started at all.
    #[error("failed to spawn command: {0}")]
    Spawn(#[source] io::Error),

    /// Waiting for the command, or reading its output, failed.
    #[error("failed to wait for command: {0}")]
    Wait(#[source] io::Error),

    /// The command was still running after `TimedOut.0` and got killed.
    #[error("command did not finish within {0:?}")]
    TimedOut(Duration),

    /// The command finished unsuccessfully.
    #[error("command exited with {0}")]
    Failed(ExitStatus),

    /// The command printed something, which is not an UTF-8 string.
    #[error("command output is not an UTF-8 string")]
    NonUtf8Output,
}

/// Adds bounded [`stdout_with_timeout`](CommandExt::stdout_with_timeout) to the [`Command`].
pub trait CommandExt: sealed::Sealed {
    /// Run the command with null stdin and stderr and capture its stdout.
    ///
    /// The child is polled until it exits or `timeout` elapses; in the latter case it is killed
    /// and reaped before returning.
    ///
    /// # Returns
    /// Trimmed stdout on success. [`Err`](CommandError) if the command could not be spawned,
    /// timed out, exited with non-zero status or printed non UTF-8 output.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use basedir::os::command_ext::CommandExt;
    /// # use std::process::Command;
    /// # use std::time::Duration;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let home = Command::new("sh")
    ///     .args(["-c", "cd && pwd"])
    ///     .stdout_with_timeout(Duration::from_secs(1))?;
    /// # Ok(())
    /// # }
    /// ```
    fn stdout_with_timeout(&mut self, timeout: Duration) -> Result<String, CommandError>;
}

impl CommandExt for Command {
    fn stdout_with_timeout(&mut self, timeout: Duration) -> Result<String, CommandError> {
        let mut child = self
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(CommandError::Spawn)?;

        // Drained concurrently, so a chatty child can't block on a full pipe.
        let reader = child.stdout.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut stdout = Vec::new();
                pipe.read_to_end(&mut stdout).map(|_| stdout)
            })
        });

        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait().map_err(CommandError::Wait)? {
                Some(status) => break status,
                None if Instant::now() >= deadline => {
                    // Kill may race with a natural exit, either way the child gets reaped.
                    // The reader is left detached, it finishes once the pipe closes.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(CommandError::TimedOut(timeout));
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        };
        if !status.success() {
            return Err(CommandError::Failed(status));
        }

        let stdout = match reader {
            Some(reader) => reader
                .join()
                .map_err(|_| CommandError::Wait(io::Error::other("stdout reader panicked")))?
                .map_err(CommandError::Wait)?,
            None => Vec::new(),
        };
        String::from_utf8(stdout)
            .map(|output| output.trim().to_owned())
            .map_err(|_| CommandError::NonUtf8Output)
    }
}

/// Capability of running an external program and capturing its output.
///
/// Home directory resolution falls back to a shell as its last resort; this trait keeps that
/// step replaceable, so tests never spawn real processes.
pub trait CommandRunner {
    /// Run `program` with `args`, returning its trimmed stdout.
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        (**self).run(program, args)
    }
}

/// [`CommandRunner`] spawning real processes, each bounded by a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemCommandRunner {
    timeout: Duration,
}

impl SystemCommandRunner {
    /// Runner bounded by [`DEFAULT_TIMEOUT`].
    pub const fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Runner killing any command still running after `timeout`.
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Bound applied to every [`run`](CommandRunner::run).
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for SystemCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        Command::new(program)
            .args(args)
            .stdout_with_timeout(self.timeout)
    }
}
