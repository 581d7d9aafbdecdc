use crate::command::{self, CommandError};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Why a single probe did not count as accessible.
///
/// None of these abort a scan: they are recorded on the [`ProbeResult`] and
/// the identifier is treated as not accessible.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Malformed identifier: {0}")]
    Malformed(String),
    #[error("Security denial: {0}")]
    SecurityDenied(String),
    #[error("Remote failure: {0}")]
    Remote(String),
    #[error("Probe timed out")]
    Timeout,
    #[error("Prober panicked: {0}")]
    Panicked(String),
    #[error("Probe failed: {0}")]
    Other(String),
}

impl ProbeError {
    /// Maps platform error text onto a probe error kind.
    pub fn classify(text: &str) -> Self {
        let message = first_meaningful_line(text);
        if text.contains("SecurityException") || text.contains("Permission Denial") {
            ProbeError::SecurityDenied(message)
        } else if text.contains("IllegalArgumentException")
            || text.contains("Unknown URI")
            || text.contains("Invalid URI")
        {
            ProbeError::Malformed(message)
        } else if text.contains("RemoteException") || text.contains("DeadObjectException") {
            ProbeError::Remote(message)
        } else {
            ProbeError::Other(message)
        }
    }
}

fn first_meaningful_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("no output")
        .to_string()
}

/// Outcome of probing one identifier. Produced and consumed per wordlist
/// entry; never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub identifier: String,
    pub accessible: bool,
    pub error: Option<ProbeError>,
}

/// A read-only existence check against one resource identifier.
pub trait Prober: Send {
    /// Queries `identifier` and returns how many rows came back.
    fn query(&mut self, identifier: &str) -> Result<usize, ProbeError>;
}

impl<P: Prober + ?Sized> Prober for Box<P> {
    fn query(&mut self, identifier: &str) -> Result<usize, ProbeError> {
        (**self).query(identifier)
    }
}

/// Probes `identifier`, containing every failure mode of the prober.
///
/// Accessible only when the query succeeds and yields at least one row. A
/// panicking prober is caught here and reported as [`ProbeError::Panicked`].
pub fn probe<P: Prober + ?Sized>(prober: &mut P, identifier: &str) -> ProbeResult {
    let outcome = catch_unwind(AssertUnwindSafe(|| prober.query(identifier)));

    let (accessible, error) = match outcome {
        Ok(Ok(rows)) => (rows > 0, None),
        Ok(Err(e)) => (false, Some(e)),
        Err(panic_payload) => {
            let msg = if let Some(s) = panic_payload.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic type".to_string()
            };
            (false, Some(ProbeError::Panicked(msg)))
        }
    };

    ProbeResult {
        identifier: identifier.to_string(),
        accessible,
        error,
    }
}

/// A prober driven by a closure, for embedding and tests.
pub struct InProcessProber<F>
where
    F: FnMut(&str) -> Result<usize, ProbeError> + Send,
{
    query_fn: F,
}

impl<F> InProcessProber<F>
where
    F: FnMut(&str) -> Result<usize, ProbeError> + Send,
{
    pub fn new(query_fn: F) -> Self {
        Self { query_fn }
    }
}

impl<F> Prober for InProcessProber<F>
where
    F: FnMut(&str) -> Result<usize, ProbeError> + Send,
{
    fn query(&mut self, identifier: &str) -> Result<usize, ProbeError> {
        (self.query_fn)(identifier)
    }
}

pub const DEFAULT_ROW_MARKER: &str = "Row:";

#[derive(Debug, Clone)]
pub struct CommandProberConfig {
    /// argv template; every `{}` in an argument is replaced by the identifier.
    pub command: Vec<String>,
    pub timeout: Duration,
    pub working_dir: Option<PathBuf>,
    /// Stdout lines starting with this marker are counted as result rows.
    pub row_marker: String,
    /// Shell-quote the identifier before substitution. Needed whenever the
    /// command line is re-parsed by a shell, as with `adb shell`.
    pub shell_quote: bool,
}

/// Runs an external query command per identifier, e.g.
/// `adb shell content query --uri {}`.
pub struct CommandProber {
    config: CommandProberConfig,
}

impl CommandProber {
    pub fn new(config: CommandProberConfig) -> Self {
        Self { config }
    }

    fn render_argv(&self, identifier: &str) -> Vec<String> {
        let value = if self.config.shell_quote {
            command::shell_quote(identifier)
        } else {
            identifier.to_string()
        };
        self.config
            .command
            .iter()
            .map(|arg| arg.replace("{}", &value))
            .collect()
    }

    fn is_row(&self, line: &str) -> bool {
        line.trim_start().starts_with(&self.config.row_marker)
    }
}

impl Prober for CommandProber {
    fn query(&mut self, identifier: &str) -> Result<usize, ProbeError> {
        let argv = self.render_argv(identifier);
        let mut cmd =
            command::build_command(&argv).map_err(|e| ProbeError::Other(e.to_string()))?;
        if let Some(cwd) = &self.config.working_dir {
            cmd.current_dir(cwd);
        }

        let output = match command::run_with_timeout(cmd, self.config.timeout) {
            Ok(output) => output,
            Err(CommandError::Timeout(_)) => return Err(ProbeError::Timeout),
            Err(e) => return Err(ProbeError::Other(e.to_string())),
        };

        let rows = output.stdout.lines().filter(|l| self.is_row(l)).count();
        // `content query` reports exceptions on stdout with a zero exit code;
        // row payloads are data and never count as errors
        let diagnostics: String = output
            .combined()
            .lines()
            .filter(|l| !self.is_row(l))
            .collect::<Vec<_>>()
            .join("\n");
        if !output.success() || diagnostics.contains("Exception") {
            return Err(ProbeError::classify(&diagnostics));
        }
        Ok(rows)
    }
}
