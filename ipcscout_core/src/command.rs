use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command line is empty")]
    EmptyCommand,
    #[error("Failed to spawn command '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Command timed out after {0:?}")]
    Timeout(Duration),
    #[error("Error waiting for child: {0}")]
    Wait(String),
}

/// Captured result of a finished external command.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Stdout and stderr joined, for error classification.
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Builds a `Command` from an argv-style vector.
pub fn build_command(argv: &[String]) -> Result<Command, CommandError> {
    let (program, args) = argv.split_first().ok_or(CommandError::EmptyCommand)?;
    let mut cmd = Command::new(program);
    cmd.args(args);
    Ok(cmd)
}

/// Quotes `value` for a POSIX shell unless it is made only of characters the
/// shell passes through unchanged.
pub fn shell_quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-+=@%:,./".contains(c));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}

fn spawn_reader<R: Read + Send + 'static>(source: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut source) = source {
            let mut raw = Vec::new();
            if source.read_to_end(&mut raw).is_ok() {
                buf = String::from_utf8_lossy(&raw).into_owned();
            }
        }
        buf
    })
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus, CommandError> {
    let start_time = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if start_time.elapsed() > timeout {
                    if let Err(e) = child.kill() {
                        return Err(CommandError::Wait(format!(
                            "Failed to kill timed-out process: {e}"
                        )));
                    }
                    let _ = child.wait();
                    return Err(CommandError::Timeout(timeout));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => return Err(CommandError::Wait(e.to_string())),
        }
    }
}

/// Runs `cmd` to completion, killing it once `timeout` elapses.
///
/// Stdout and stderr are drained on helper threads so a chatty child cannot
/// block on a full pipe while we poll for its exit.
pub fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
) -> Result<CommandOutput, CommandError> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .map_err(|source| CommandError::Spawn { program, source })?;

    let stdout_reader = spawn_reader(child.stdout.take());
    let stderr_reader = spawn_reader(child.stderr.take());

    let status = wait_with_timeout(&mut child, timeout)?;

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    Ok(CommandOutput {
        status,
        stdout,
        stderr,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn captures_stdout_and_stderr() {
        let output = run_with_timeout(sh("echo out; echo err 1>&2"), Duration::from_secs(5))
            .expect("command should run");
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn reports_non_zero_exit() {
        let output = run_with_timeout(sh("exit 3"), Duration::from_secs(5)).unwrap();
        assert!(!output.success());
        assert_eq!(output.status.code(), Some(3));
    }

    #[test]
    fn kills_on_timeout() {
        let err = run_with_timeout(sh("sleep 5"), Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, CommandError::Timeout(_)), "got {err:?}");
    }

    #[test]
    fn spawn_failure_names_the_program() {
        let argv = vec!["./this_command_does_not_exist_ever_12345".to_string()];
        let cmd = build_command(&argv).unwrap();
        match run_with_timeout(cmd, Duration::from_secs(1)) {
            Err(CommandError::Spawn { program, .. }) => {
                assert!(program.contains("this_command_does_not_exist"))
            }
            other => panic!("Expected Spawn error, got {other:?}"),
        }
    }

    #[test]
    fn shell_quote_leaves_plain_words_alone() {
        assert_eq!(shell_quote("content://p/users"), "content://p/users");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("hello world"), "'hello world'");
        assert_eq!(shell_quote("u;echo Row: 1"), "'u;echo Row: 1'");
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
    }

    #[test]
    fn quoted_values_survive_a_shell_unchanged() {
        for value in ["a b", "x;echo Row: 1", "$(id)", "it's", "a&b|c"] {
            let script = format!("printf '%s' {}", shell_quote(value));
            let output = run_with_timeout(sh(&script), Duration::from_secs(5)).unwrap();
            assert_eq!(output.stdout, value);
        }
    }

    #[test]
    fn empty_argv_is_rejected() {
        assert!(matches!(build_command(&[]), Err(CommandError::EmptyCommand)));
    }
}
