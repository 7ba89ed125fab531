use core::fmt;
use std::{
    io::{self, Read},
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

// How often a running child is polled while a deadline is armed.
const POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Errors raised while running an external program.
#[derive(Debug)]
pub enum CommandError {
    /// The program could not be started at all.
    Spawn {
        /// The command line that was attempted
        command: String,
        /// The underlying io error
        source: io::Error,
    },
    /// The program ran and exited unsuccessfully.
    Failed {
        /// The command line that was run
        command: String,
        /// The exit status of the child
        status: ExitStatus,
        /// Whatever the child wrote to stderr
        stderr: String,
    },
    /// The program didn't finish before its deadline and was killed.
    Timeout {
        /// The command line that was run
        command: String,
        /// The deadline that was exceeded
        timeout: Duration,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return match self {
            Self::Spawn { command, source } => write!(f, "Couldn't run '{}': {}", command, source),
            Self::Failed { command, status, stderr } => write!(
                f,
                "'{}' failed with {}: '{}'",
                command,
                status,
                stderr.trim(),
            ),
            Self::Timeout { command, timeout } => write!(
                f,
                "'{}' timed out after {}ms",
                command,
                timeout.as_millis(),
            ),
        };
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        return match self {
            Self::Spawn { source, .. } => Some(source),
            _ => None,
        };
    }
}

impl CommandError {
    /// True for the [`CommandError::Timeout`] variant.
    pub fn is_timeout(&self) -> bool {
        return matches!(self, Self::Timeout { .. });
    }
}

/// Checks whether any error in the chain is a [`CommandError::Timeout`].
/// ```
/// # use std::time::Duration;
/// # use gitstatus::command::{timed_out, CommandError};
/// let err = anyhow::Error::new(CommandError::Timeout {
///     command: "git status".into(),
///     timeout: Duration::from_millis(100),
/// }).context("Couldn't read status");
/// assert!(timed_out(&err));
/// assert!(!timed_out(&anyhow::anyhow!("something else")));
/// ```
pub fn timed_out(err: &anyhow::Error) -> bool {
    return err
        .chain()
        .any(|cause| match cause.downcast_ref::<CommandError>() {
            Some(v) => v.is_timeout(),
            None => false,
        });
}

/// Runs one program in a fixed working directory, each call bounded by the
/// same optional timeout.
#[derive(Debug, Clone)]
pub struct Runner {
    /// The program to execute, looked up on `PATH`
    pub program: String,
    /// The working directory of every child
    pub dir: PathBuf,
    /// Deadline per invocation, `None` waits forever
    pub timeout: Option<Duration>,
}

impl Runner {
    /// Makes a runner for `program` inside `dir`.
    pub fn new(program: &str, dir: &Path, timeout: Option<Duration>) -> Self {
        return Self {
            program: program.to_owned(),
            dir: dir.to_owned(),
            timeout,
        };
    }

    fn expired(&self, command: String) -> CommandError {
        log::warn!("Output of '{}' still open after deadline", command);
        return CommandError::Timeout {
            command,
            timeout: self.timeout.unwrap_or_default(),
        };
    }

    fn describe(&self, args: &[&str]) -> String {
        let mut command = self.program.clone();
        for arg in args {
            command.push(' ');
            command.push_str(arg);
        }
        return command;
    }

    /// Runs the program with `args` and returns its stdout.
    /// ```
    /// # use std::path::Path;
    /// # use gitstatus::command::Runner;
    /// # #[cfg(unix)] {
    /// let runner = Runner::new("echo", Path::new("."), None);
    /// assert_eq!(runner.run(&["hello"]).unwrap(), "hello\n");
    /// # }
    /// ```
    pub fn run(&self, args: &[&str]) -> Result<String, CommandError> {
        let started = Instant::now();
        let command = self.describe(args);
        log::debug!("Command: {}", command);

        let mut child = match Command::new(&self.program)
            .args(args)
            .current_dir(&self.dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(v) => v,
            Err(source) => return Err(CommandError::Spawn { command, source }),
        };

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        // A deadline too far out to represent is no deadline at all.
        let deadline = self
            .timeout
            .and_then(|timeout| started.checked_add(timeout).map(|v| (timeout, v)));

        let status = match deadline {
            Some((timeout, deadline)) => match wait_until(&mut child, deadline) {
                Ok(Some(v)) => v,
                Ok(None) => return Err(CommandError::Timeout { command, timeout }),
                Err(source) => return Err(CommandError::Spawn { command, source }),
            },
            None => match child.wait() {
                Ok(v) => v,
                Err(source) => return Err(CommandError::Spawn { command, source }),
            },
        };

        // Anything the child left running may still hold the pipes open, so
        // reading them is bounded by the same deadline.
        let until = deadline.map(|(_, v)| v);
        let stdout = match collect(stdout, until) {
            Some(v) => v,
            None => return Err(self.expired(command)),
        };
        if !status.success() {
            let stderr = match collect(stderr, until) {
                Some(v) => v,
                None => return Err(self.expired(command)),
            };
            return Err(CommandError::Failed { command, status, stderr });
        }

        log::trace!("'{}' finished in {:?}", command, started.elapsed());
        return Ok(stdout);
    }
}

/// Waits for the child until `deadline`, killing it once the deadline passes.
/// Returns `None` if the child had to be killed.
fn wait_until(child: &mut Child, deadline: Instant) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }

        let now = Instant::now();
        if now >= deadline {
            log::warn!("Killing child {} after deadline", child.id());
            // The child may exit between try_wait and kill.
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

type Output = Receiver<io::Result<Vec<u8>>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Output> {
    return pipe.map(|mut pipe| {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let read = pipe.read_to_end(&mut buf).map(|_| buf);
            // The receiver is gone once the deadline passed.
            let _ = sender.send(read);
        });
        return receiver;
    });
}

/// Waits for a reader thread, giving up at `deadline`. Returns `None` only
/// when the deadline passed first.
fn collect(output: Option<Output>, deadline: Option<Instant>) -> Option<String> {
    let received = match (output, deadline) {
        (None, _) => return Some(String::new()),
        (Some(v), None) => v.recv().map_err(|_| RecvTimeoutError::Disconnected),
        (Some(v), Some(deadline)) => {
            v.recv_timeout(deadline.saturating_duration_since(Instant::now()))
        },
    };

    let bytes = match received {
        Ok(Ok(v)) => v,
        Ok(Err(e)) => {
            log::warn!("Couldn't read child output: {}", e);
            Vec::new()
        },
        Err(RecvTimeoutError::Timeout) => return None,
        Err(RecvTimeoutError::Disconnected) => {
            log::warn!("Output reader thread panicked");
            Vec::new()
        },
    };
    return Some(String::from_utf8_lossy(&bytes).to_string());
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn runner(program: &str, timeout: Option<Duration>) -> Runner {
        return Runner::new(program, Path::new("."), timeout);
    }

    #[test]
    fn captures_stdout() {
        let out = runner("printf", Some(Duration::from_secs(5)))
            .run(&["a\\nb\\n"])
            .unwrap();
        assert_eq!(out, "a\nb\n");
    }

    #[test]
    fn runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = Runner::new("pwd", dir.path(), None).run(&[]).unwrap();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(Path::new(out.trim()).canonicalize().unwrap(), expected);
    }

    #[test]
    fn non_zero_exit_is_failed() {
        let err = runner("false", None).run(&[]).unwrap_err();
        assert!(matches!(err, CommandError::Failed { .. }), "{err}");
        assert!(!err.is_timeout());
    }

    #[test]
    fn failed_keeps_stderr() {
        let err = runner("sh", None)
            .run(&["-c", "echo broken >&2; exit 3"])
            .unwrap_err();
        match err {
            CommandError::Failed { status, stderr, .. } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "broken\n");
            },
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let err = runner("definitely-not-a-real-binary-7f3a", None)
            .run(&[])
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }), "{err}");
    }

    #[test]
    fn slow_child_is_killed_on_timeout() {
        let started = Instant::now();
        let err = runner("sleep", Some(Duration::from_millis(50)))
            .run(&["10"])
            .unwrap_err();
        assert!(err.is_timeout(), "{err}");
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn background_grandchild_cannot_outlive_timeout() {
        // The shell exits at once but its sleep keeps stdout open.
        let started = Instant::now();
        let err = runner("sh", Some(Duration::from_millis(100)))
            .run(&["-c", "sleep 3 & echo hi"])
            .unwrap_err();
        assert!(err.is_timeout(), "{err}");
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn fast_child_beats_timeout() {
        let out = runner("echo", Some(Duration::from_secs(5))).run(&["ok"]).unwrap();
        assert_eq!(out, "ok\n");
    }

    #[test]
    fn display_names_command() {
        let err = runner("sleep", Some(Duration::from_millis(10)))
            .run(&["10"])
            .unwrap_err();
        assert_eq!(err.to_string(), "'sleep 10' timed out after 10ms");
    }
}
