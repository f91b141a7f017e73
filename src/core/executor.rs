//! Single-flight external command execution with a timeout.
//!
//! Every version-control invocation made by the snapshot subsystem goes through a
//! [`CommandExecutor`]. One executor belongs to one repository handle and admits a
//! single in-flight command: a second call made while one is running fails
//! immediately with [`SnapshotError::CommandBusy`] instead of queuing.
//!
//! # Failure normalization
//! On a nonzero exit the error text is taken from stderr first, then from stdout
//! when it carries a known failure keyword, and finally synthesized from the exit
//! code. Output reporting that there was nothing to commit becomes
//! [`SnapshotError::NothingToCommit`] so callers can treat it as an expected outcome.

use crate::core::error::{Result, SnapshotError};
use log::debug;
use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default timeout for a single command
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Lowercase markers that make stdout worth reporting on failure
const FAILURE_KEYWORDS: &[&str] = &[
    "nothing to commit",
    "nothing added to commit",
    "no changes added to commit",
    "fatal",
    "error",
    "failed",
];

const NO_CHANGES_PHRASES: &[&str] = &[
    "nothing to commit",
    "nothing added to commit",
    "no changes added to commit",
    "working tree clean",
];

const BUSY_MESSAGE: &str = "Another git operation is in progress";

/// Releases the in-flight flag on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct CommandExecutor {
    program: OsString,
    working_dir: PathBuf,
    timeout: Duration,
    in_flight: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl CommandExecutor {
    /// Create an executor running `git` in `working_dir`
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self::with_program("git", working_dir)
    }

    pub fn with_program(program: impl Into<OsString>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.into(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
            in_flight: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Whether a command is currently running through this executor
    pub fn is_operating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Most recent failure message, kept for diagnostics
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run a command in the executor's working directory and return its stdout
    pub fn run<S: AsRef<OsStr>>(&self, args: &[S]) -> Result<String> {
        self.run_in(args, None)
    }

    /// Run a command in `cwd` (or the executor's working directory) and return its stdout
    pub fn run_in<S: AsRef<OsStr>>(&self, args: &[S], cwd: Option<&Path>) -> Result<String> {
        let label = command_label(args);

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.record_error(BUSY_MESSAGE);
            debug!("Rejected {label}: {BUSY_MESSAGE}");
            return Err(SnapshotError::CommandBusy);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let cwd = cwd.unwrap_or(&self.working_dir);
        debug!(
            "Running {} {}",
            self.program.to_string_lossy(),
            display_args(args)
        );
        debug!("  working directory: {}", cwd.display());

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .current_dir(cwd)
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Never let discovery escape into an enclosing repository.
        if let Some(ceiling) = cwd.parent() {
            command.env("GIT_CEILING_DIRECTORIES", ceiling);
        }

        let mut child = command
            .spawn()
            .map_err(|source| {
                self.record_error(&format!("Failed to start {label}: {source}"));
                SnapshotError::Spawn {
                    command: label.clone(),
                    source,
                }
            })?;

        let stdout_reader = drain(child.stdout.take());
        let stderr_reader = drain(child.stderr.take());
        let start = Instant::now();

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() > self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        let err = SnapshotError::Timeout {
                            command: label,
                            seconds: self.timeout.as_secs(),
                        };
                        self.record_error(&err.to_string());
                        debug!("{err}");
                        return Err(err);
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(source) => {
                    let _ = child.kill();
                    self.record_error(&source.to_string());
                    return Err(SnapshotError::Spawn {
                        command: label,
                        source,
                    });
                }
            }
        };

        let stdout = collect(stdout_reader);
        let stderr = collect(stderr_reader);
        debug!("{label} exited with {status}");

        if status.success() {
            return Ok(stdout);
        }

        let message = failure_message(&stderr, &stdout, status.code());
        self.record_error(&message);

        if is_no_changes(&message) {
            debug!("{label}: nothing to commit");
            return Err(SnapshotError::NothingToCommit { message });
        }

        debug!("{label} failed: {message}");
        Err(SnapshotError::command_failed(label, message))
    }

    fn record_error(&self, message: &str) {
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(message.to_string());
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut reader| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = reader.read_to_end(&mut buffer);
            buffer
        })
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// The subcommand name, skipping leading `-c key=value` overrides
fn command_label<S: AsRef<OsStr>>(args: &[S]) -> String {
    let mut args = args.iter().map(|arg| arg.as_ref().to_string_lossy());
    while let Some(arg) = args.next() {
        if arg == "-c" {
            args.next();
            continue;
        }
        return arg.into_owned();
    }
    String::new()
}

fn display_args<S: AsRef<OsStr>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| arg.as_ref().to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the failure text for a nonzero exit
pub fn failure_message(stderr: &str, stdout: &str, code: Option<i32>) -> String {
    let mut parts = Vec::new();

    let stderr = stderr.trim();
    if !stderr.is_empty() {
        parts.push(stderr.to_string());
    }

    let stdout = stdout.trim();
    if !stdout.is_empty() {
        let lower = stdout.to_lowercase();
        if FAILURE_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
            parts.push(stdout.to_string());
        }
    }

    if parts.is_empty() {
        return match code {
            Some(code) => format!("git command failed with exit code {code}"),
            None => "git command terminated by signal".to_string(),
        };
    }

    parts.join(" | ")
}

/// Whether failure text reports that there was nothing to commit
pub fn is_no_changes(message: &str) -> bool {
    let lower = message.to_lowercase();
    NO_CHANGES_PHRASES.iter().any(|phrase| lower.contains(phrase))
}
