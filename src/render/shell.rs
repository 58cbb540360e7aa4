use std::ffi::OsString;
use std::io;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Exited(i32),
    /// Killed by a signal; no exit code.
    Terminated,
    /// Still running at the deadline and killed.
    TimedOut,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ProcessOutcome::Exited(0))
    }
}

/// Runs an external program to completion. An `Err` means the program
/// could not be started at all.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<ProcessOutcome>;
}

/// Runs commands on the host with output discarded.
#[derive(Debug, Clone, Default)]
pub struct SystemShell {
    timeout: Option<Duration>,
}

impl SystemShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl CommandRunner for SystemShell {
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<ProcessOutcome> {
        debug!(program, ?args, "spawning");
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let status = match self.timeout {
            None => child.wait()?,
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                loop {
                    if let Some(status) = child.try_wait()? {
                        break status;
                    }
                    if Instant::now() >= deadline {
                        child.kill()?;
                        child.wait()?;
                        return Ok(ProcessOutcome::TimedOut);
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
        };

        Ok(match status.code() {
            Some(code) => ProcessOutcome::Exited(code),
            None => ProcessOutcome::Terminated,
        })
    }
}
