//! External process execution.
//!
//! The core never spawns processes directly; it hands a fully built command
//! string and a timeout to a [`ProcessRunner`]. The default [`ShellRunner`]
//! runs the command through `sh -c`, enforcing the timeout by polling the
//! child and killing it once the deadline passes. Tests substitute their
//! own runner to exercise conversions without the external tools installed.

use std::borrow::Cow;
use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::trace;

/// The structured result of one external process invocation.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
    /// The exit code; -1 when the process was killed or terminated by a signal.
    pub exit_code: i32,
    /// Whether the timeout elapsed before the process exited.
    pub timed_out: bool,
}

impl ProcessOutput {
    /// Returns true if the process exited zero within the timeout.
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }

    /// Standard output as lossy UTF-8.
    pub fn stdout_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    /// Standard error as lossy UTF-8.
    pub fn stderr_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

/// Executes a command string with a timeout.
pub trait ProcessRunner: Send + Sync {
    /// Runs the command, blocking until it exits or the timeout elapses.
    ///
    /// A timeout is not an `Err`: it is reported through
    /// [`ProcessOutput::timed_out`] so the caller can treat it as a
    /// process failure with whatever output was captured.
    fn run(&self, command: &str, timeout: Duration) -> io::Result<ProcessOutput>;
}

/// Default runner executing commands via `sh -c`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ShellRunner {
    /// Creates a new shell runner.
    pub fn new() -> Self {
        Self
    }
}

/// Interval between child liveness polls.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

impl ProcessRunner for ShellRunner {
    fn run(&self, command: &str, timeout: Duration) -> io::Result<ProcessOutput> {
        trace!(command, timeout_secs = timeout.as_secs(), "spawning shell command");

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain the pipes on dedicated threads so a chatty child cannot
        // deadlock against a full pipe buffer while we poll for exit.
        let stdout_handle = child.stdout.take().map(spawn_reader);
        let stderr_handle = child.stderr.take().map(spawn_reader);

        let deadline = Instant::now() + timeout;
        let mut timed_out = false;

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break Some(status);
            }

            if Instant::now() >= deadline {
                timed_out = true;
                child.kill()?;
                child.wait()?;
                break None;
            }

            thread::sleep(POLL_INTERVAL);
        };

        let stdout = join_reader(stdout_handle);
        let stderr = join_reader(stderr_handle);

        let exit_code = status.and_then(|s| s.code()).unwrap_or(-1);

        Ok(ProcessOutput {
            stdout,
            stderr,
            exit_code,
            timed_out,
        })
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut source: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = source.read_to_end(&mut buffer);
        buffer
    })
}

fn join_reader(handle: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
