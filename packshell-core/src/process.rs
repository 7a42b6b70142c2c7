/*!
Subprocess execution and output capture.

The [`ProcessRunner`] trait is the seam between command assembly and the
operating system. Adapters only ever see a [`ProcessResult`] snapshot, so
a missing binary and a failing binary look the same shape to them and
unit tests can script outcomes without spawning anything.
*/

use std::io::Read;
use std::process::{Child, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::command::Command;

/// Outcome of one subprocess execution.
///
/// The snapshot is immutable once produced. A failed spawn is represented
/// here too: `success` is false, `exit_code` is `None` and `stderr`
/// carries the OS error text, so capability probes can treat "binary not
/// installed" exactly like "binary reported failure".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// Whether the process ran to completion and reported success
    pub success: bool,

    /// Exit code, when the process ran and the platform reported one
    pub exit_code: Option<i32>,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,
}

impl ProcessResult {
    /// Snapshot of a process that ran to completion.
    pub fn completed(status: &ExitStatus, stdout: String, stderr: String) -> Self {
        Self {
            success: status.success(),
            exit_code: status.code(),
            stdout,
            stderr,
        }
    }

    /// Snapshot of a spawn attempt that never produced a child process.
    pub fn spawn_failure(error: &std::io::Error) -> Self {
        Self {
            success: false,
            exit_code: None,
            stdout: String::new(),
            stderr: error.to_string(),
        }
    }
}

/// Executes prepared commands as child processes.
pub trait ProcessRunner: Send + Sync {
    /// Run the command to completion and capture its output.
    ///
    /// This is infallible by design: every failure mode, including an
    /// unspawnable binary, is folded into the returned [`ProcessResult`].
    /// Callers decide whether a failed result is an error.
    fn run(&self, command: &Command) -> ProcessResult;
}

/// Runner backed by `std::process`, blocking until the child exits.
///
/// Without a timeout the call blocks as long as the tool runs, matching
/// the wrapped tools' own behavior. With a timeout, a child that outlives
/// the deadline is killed and reaped, and the result is marked failed
/// with a note appended to its stderr.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

enum WaitOutcome {
    Exited(ExitStatus),
    TimedOut(Duration),
    Lost(std::io::Error),
}

impl SystemRunner {
    /// Create a runner with no timeout.
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Create a runner that kills children running longer than `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    fn wait(&self, child: &mut Child) -> WaitOutcome {
        let limit = match self.timeout {
            Some(limit) => limit,
            None => {
                return match child.wait() {
                    Ok(status) => WaitOutcome::Exited(status),
                    Err(err) => WaitOutcome::Lost(err),
                };
            }
        };

        let deadline = Instant::now() + limit;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return WaitOutcome::Exited(status),
                Ok(None) => {}
                Err(err) => return WaitOutcome::Lost(err),
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return WaitOutcome::TimedOut(limit);
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, command: &Command) -> ProcessResult {
        debug!(command = %command, "spawning archiver process");
        let mut child = match std::process::Command::new(command.program())
            .args(command.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                debug!(command = %command, error = %err, "spawn failed");
                return ProcessResult::spawn_failure(&err);
            }
        };

        // Drain both pipes on their own threads; a child that fills one
        // pipe while we block on the other would deadlock otherwise.
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let stdout_thread = thread::spawn(move || read_pipe(stdout_pipe));
        let stderr_thread = thread::spawn(move || read_pipe(stderr_pipe));

        let outcome = self.wait(&mut child);

        let stdout = stdout_thread.join().unwrap_or_default();
        let mut stderr = stderr_thread.join().unwrap_or_default();

        match outcome {
            WaitOutcome::Exited(status) => {
                debug!(command = %command, exit_code = ?status.code(), "archiver process exited");
                ProcessResult::completed(&status, stdout, stderr)
            }
            WaitOutcome::TimedOut(limit) => {
                debug!(command = %command, timeout_secs = limit.as_secs(), "archiver process timed out");
                append_note(
                    &mut stderr,
                    &format!("process killed after exceeding timeout of {}s", limit.as_secs()),
                );
                ProcessResult {
                    success: false,
                    exit_code: None,
                    stdout,
                    stderr,
                }
            }
            WaitOutcome::Lost(err) => {
                append_note(&mut stderr, &err.to_string());
                ProcessResult {
                    success: false,
                    exit_code: None,
                    stdout,
                    stderr,
                }
            }
        }
    }
}

fn read_pipe<R: Read>(pipe: Option<R>) -> String {
    let mut pipe = match pipe {
        Some(pipe) => pipe,
        None => return String::new(),
    };
    let mut bytes = Vec::new();
    if pipe.read_to_end(&mut bytes).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn append_note(stderr: &mut String, note: &str) {
    if !stderr.is_empty() && !stderr.ends_with('\n') {
        stderr.push('\n');
    }
    stderr.push_str(note);
}

/// Scripted runner for unit tests. Returns canned results and records
/// every command line it was asked to run, so tests can assert both the
/// adapter's reaction and the exact invocation it built.
#[cfg(test)]
pub struct ScriptedRunner {
    script: std::sync::Mutex<Script>,
    calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
enum Script {
    Fixed(ProcessResult),
    Sequence(std::collections::VecDeque<ProcessResult>),
}

#[cfg(test)]
impl ScriptedRunner {
    fn with_script(script: Script) -> Self {
        Self {
            script: std::sync::Mutex::new(script),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Every invocation succeeds with empty output.
    pub fn succeeding() -> Self {
        Self::succeeding_with("")
    }

    /// Every invocation succeeds with the given stdout.
    pub fn succeeding_with(stdout: &str) -> Self {
        Self::with_script(Script::Fixed(ProcessResult {
            success: true,
            exit_code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }))
    }

    /// Every invocation fails with exit code 2 and the given stderr.
    pub fn failing(stderr: &str) -> Self {
        Self::with_script(Script::Fixed(ProcessResult {
            success: false,
            exit_code: Some(2),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }))
    }

    /// Every invocation looks like the binary was not found.
    pub fn spawn_failing() -> Self {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory");
        Self::with_script(Script::Fixed(ProcessResult::spawn_failure(&err)))
    }

    /// One queued result per invocation, in order. Running past the end
    /// of the queue panics, which in a test means the adapter spawned
    /// more processes than expected.
    pub fn sequence<I: IntoIterator<Item = ProcessResult>>(results: I) -> Self {
        Self::with_script(Script::Sequence(results.into_iter().collect()))
    }

    /// Command lines recorded so far, in invocation order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ProcessRunner for ScriptedRunner {
    fn run(&self, command: &Command) -> ProcessResult {
        self.calls.lock().unwrap().push(command.command_line());
        let mut script = self.script.lock().unwrap();
        match &mut *script {
            Script::Fixed(result) => result.clone(),
            Script::Sequence(queue) => queue.pop_front().expect("scripted runner exhausted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_failure_result_shape() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory");
        let result = ProcessResult::spawn_failure(&err);
        assert!(!result.success);
        assert_eq!(result.exit_code, None);
        assert!(result.stdout.is_empty());
        assert!(result.stderr.contains("No such file or directory"));
    }

    #[test]
    fn test_scripted_runner_records_command_lines() {
        let runner = ScriptedRunner::succeeding();
        let command = Command::new("zip").arg("-r").arg("out.zip").arg("src");
        let result = runner.run(&command);
        assert!(result.success);
        assert_eq!(runner.calls(), vec!["zip -r out.zip src".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_stdout() {
        let runner = SystemRunner::new();
        let result = runner.run(&Command::new("sh").args(["-c", "echo hello"]));
        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_failure() {
        let runner = SystemRunner::new();
        let result = runner.run(&Command::new("sh").args(["-c", "echo oops >&2; exit 3"]));
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_lossy_decodes_non_utf8_output() {
        let runner = SystemRunner::new();
        let result = runner.run(&Command::new("sh").args(["-c", "printf 'a\\377b'"]));
        assert!(result.success);
        assert_eq!(result.stdout, "a\u{fffd}b");
    }

    #[test]
    fn test_system_runner_missing_binary_is_a_failed_result() {
        let runner = SystemRunner::new();
        let result = runner.run(&Command::new("definitely-not-an-archiver-binary"));
        assert!(!result.success);
        assert_eq!(result.exit_code, None);
        assert!(!result.stderr.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_timeout_kills_the_child() {
        let runner = SystemRunner::with_timeout(Duration::from_millis(100));
        let start = Instant::now();
        let result = runner.run(&Command::new("sh").args(["-c", "exec sleep 10"]));
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(!result.success);
        assert_eq!(result.exit_code, None);
        assert!(result.stderr.contains("timeout"));
    }
}
