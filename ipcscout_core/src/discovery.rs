//! Wordlist-driven path discovery against a provider authority.
//!
//! A [`DiscoveryJob`] walks a wordlist sequentially, probing
//! `scheme://authority/word` for every entry. Each probe is contained: a
//! rejected, malformed or panicking probe only marks that identifier as not
//! accessible. Accessible identifiers are kept in wordlist order and written
//! through to a [`ResultSink`] as soon as they are found.
//!
//! [`DiscoveryEngine`] schedules jobs on the tokio blocking pool and hands
//! back a [`DiscoveryHandle`] carrying the job's cancellation token and its
//! ordered event stream.

use crate::permission::{GateError, PermissionGate};
use crate::prober::{Prober, probe};
use crate::sink::ResultSink;
use crate::wordlist::Wordlist;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

pub const DEFAULT_SCHEME: &str = "content";
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 10_000;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Another job already owns this authority's output.
    #[error("A discovery job for '{0}' is already running")]
    AlreadyRunning(String),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("No tokio runtime available to schedule the discovery job")]
    NoRuntime,

    /// Raised before the job starts, so earlier output is left untouched.
    #[error("Failed to open wordlist {path:?}: {source}")]
    Wordlist {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },

    /// The worker stopped without delivering its report.
    #[error("Discovery worker ended without reporting: {0}")]
    WorkerLost(String),
}

/// Lifecycle of a discovery job: `Idle → Running → {Completed, Cancelled,
/// Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Cancelled | JobState::Failed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Scheme of generated identifiers.
    pub scheme: String,
    /// Emit a progress event every this many processed entries. Zero
    /// disables periodic progress; the final event is always sent.
    pub progress_interval: u64,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Cumulative number of wordlist entries probed.
    pub processed: u64,
    /// Set on the last progress event of a job.
    pub done: bool,
}

/// Final outcome of a job, delivered exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub authority: String,
    pub state: JobState,
    pub processed: u64,
    pub accessible: Vec<String>,
    /// Why the job failed, when `state` is `Failed`.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryEvent {
    Progress(Progress),
    Finished(DiscoveryReport),
}

/// State of one brute-force run. Owned and mutated only by the worker
/// running it.
#[derive(Debug)]
pub struct DiscoveryJob {
    authority: String,
    options: DiscoveryOptions,
    state: JobState,
    processed: u64,
    accessible: Vec<String>,
}

impl DiscoveryJob {
    pub fn new(authority: impl Into<String>, options: DiscoveryOptions) -> Self {
        Self {
            authority: authority.into(),
            options,
            state: JobState::Idle,
            processed: 0,
            accessible: Vec::new(),
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn accessible(&self) -> &[String] {
        &self.accessible
    }

    /// `scheme://authority/word`, with the word trimmed.
    pub fn identifier_for(&self, word: &str) -> String {
        format!(
            "{}://{}/{}",
            self.options.scheme,
            self.authority,
            word.trim()
        )
    }

    /// Runs the job to a terminal state on the calling thread.
    ///
    /// Cancellation is checked once before each entry; whatever was found
    /// before it is observed is kept. A sink failure or a wordlist read error
    /// ends the job as `Failed` with the partial result. `on_progress` sees
    /// non-decreasing counts and always receives a final `done` event.
    pub fn run<W, P, S, F>(
        mut self,
        words: W,
        prober: &mut P,
        sink: &mut S,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> DiscoveryReport
    where
        W: IntoIterator<Item = io::Result<String>>,
        P: Prober + ?Sized,
        S: ResultSink + ?Sized,
        F: FnMut(Progress),
    {
        self.state = JobState::Running;
        info!(authority = %self.authority, "discovery started");

        let mut failure: Option<String> = None;
        let mut cancelled = false;

        match sink.reset() {
            Ok(()) => {
                let mut words = words.into_iter();
                loop {
                    if cancel.is_cancelled() {
                        cancelled = true;
                        break;
                    }
                    let word = match words.next() {
                        Some(Ok(word)) => word,
                        Some(Err(e)) => {
                            error!(
                                authority = %self.authority,
                                error = %e,
                                "wordlist read failed"
                            );
                            failure = Some(format!("Failed to read wordlist: {e}"));
                            break;
                        }
                        None => break,
                    };

                    let identifier = self.identifier_for(&word);
                    let result = probe(prober, &identifier);
                    self.processed += 1;

                    if let Some(err) = &result.error {
                        trace!(
                            identifier = %result.identifier,
                            error = %err,
                            "probe not accessible"
                        );
                    }

                    if result.accessible {
                        debug!(identifier = %result.identifier, "accessible path");
                        let write = sink.append(&result.identifier);
                        self.accessible.push(result.identifier);
                        if let Err(e) = write {
                            error!(
                                authority = %self.authority,
                                error = %e,
                                "result sink failed"
                            );
                            failure = Some(e.to_string());
                            break;
                        }
                    }

                    let interval = self.options.progress_interval;
                    if interval > 0 && self.processed % interval == 0 {
                        info!(
                            authority = %self.authority,
                            processed = self.processed,
                            "discovery progress"
                        );
                        on_progress(Progress {
                            processed: self.processed,
                            done: false,
                        });
                    }
                }
            }
            Err(e) => {
                error!(authority = %self.authority, error = %e, "could not open result sink");
                failure = Some(e.to_string());
            }
        }

        self.state = if failure.is_some() {
            JobState::Failed
        } else if cancelled {
            JobState::Cancelled
        } else {
            JobState::Completed
        };

        info!(
            authority = %self.authority,
            processed = self.processed,
            found = self.accessible.len(),
            state = ?self.state,
            "discovery finished"
        );
        on_progress(Progress {
            processed: self.processed,
            done: true,
        });

        DiscoveryReport {
            authority: self.authority,
            state: self.state,
            processed: self.processed,
            accessible: self.accessible,
            error: failure,
        }
    }
}

type Registry = Arc<Mutex<HashSet<String>>>;

/// Marks an authority busy for as long as it is alive.
struct ActiveJob {
    registry: Registry,
    authority: String,
}

impl ActiveJob {
    fn claim(registry: &Registry, authority: &str) -> Result<Self, DiscoveryError> {
        let mut active = registry.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(authority.to_string()) {
            return Err(DiscoveryError::AlreadyRunning(authority.to_string()));
        }
        Ok(Self {
            registry: Arc::clone(registry),
            authority: authority.to_string(),
        })
    }
}

impl Drop for ActiveJob {
    fn drop(&mut self) {
        let mut active = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        active.remove(&self.authority);
    }
}

/// Starts discovery jobs, at most one per authority at a time.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryEngine {
    options: DiscoveryOptions,
    active: Registry,
}

impl DiscoveryEngine {
    pub fn new(options: DiscoveryOptions) -> Self {
        Self {
            options,
            active: Registry::default(),
        }
    }

    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    pub fn is_running(&self, authority: &str) -> bool {
        self.active
            .lock()
            .map(|active| active.contains(authority))
            .unwrap_or_else(|e| e.into_inner().contains(authority))
    }

    /// Checks the permission gate, then starts discovery. On denial no job
    /// is created.
    pub fn start_authorized<P, S>(
        &self,
        gate: &PermissionGate<'_>,
        authority: &str,
        wordlist: Wordlist,
        sink: S,
        prober: P,
    ) -> Result<DiscoveryHandle, DiscoveryError>
    where
        P: Prober + 'static,
        S: ResultSink + 'static,
    {
        gate.authorize(authority)?;
        self.start_discovery(authority, wordlist, sink, prober)
    }

    /// Schedules a job on the blocking pool of the current tokio runtime and
    /// returns immediately.
    pub fn start_discovery<P, S>(
        &self,
        authority: &str,
        wordlist: Wordlist,
        mut sink: S,
        mut prober: P,
    ) -> Result<DiscoveryHandle, DiscoveryError>
    where
        P: Prober + 'static,
        S: ResultSink + 'static,
    {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| DiscoveryError::NoRuntime)?;
        let words = wordlist
            .entries()
            .map_err(|source| DiscoveryError::Wordlist {
                path: match &wordlist {
                    Wordlist::File(path) => Some(path.clone()),
                    Wordlist::Words(_) => None,
                },
                source,
            })?;
        let guard = ActiveJob::claim(&self.active, authority)?;

        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let job = DiscoveryJob::new(authority, self.options.clone());
        let worker_cancel = cancel.clone();

        let task = runtime.spawn_blocking(move || {
            let report = job.run(words, &mut prober, &mut sink, &worker_cancel, |p| {
                let _ = tx.send(DiscoveryEvent::Progress(p));
            });
            drop(sink);
            // free the authority before anyone can observe the report
            drop(guard);
            let _ = tx.send(DiscoveryEvent::Finished(report));
        });

        Ok(DiscoveryHandle {
            authority: authority.to_string(),
            cancel,
            events: rx,
            task,
        })
    }
}

/// Caller's side of a running job.
pub struct DiscoveryHandle {
    authority: String,
    cancel: CancellationToken,
    events: mpsc::UnboundedReceiver<DiscoveryEvent>,
    task: JoinHandle<()>,
}

impl DiscoveryHandle {
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Requests cooperative cancellation; takes effect before the next entry.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Next event in emission order; `Finished` is always last.
    pub async fn next_event(&mut self) -> Option<DiscoveryEvent> {
        self.events.recv().await
    }

    /// Drives the job to its report, passing progress events to
    /// `on_progress`.
    ///
    /// If the report was already taken through [`next_event`](Self::next_event)
    /// this returns [`DiscoveryError::WorkerLost`].
    pub async fn wait_with_progress<F>(
        mut self,
        mut on_progress: F,
    ) -> Result<DiscoveryReport, DiscoveryError>
    where
        F: FnMut(Progress),
    {
        while let Some(event) = self.events.recv().await {
            match event {
                DiscoveryEvent::Progress(p) => on_progress(p),
                DiscoveryEvent::Finished(report) => return Ok(report),
            }
        }
        match self.task.await {
            Err(e) => Err(DiscoveryError::WorkerLost(e.to_string())),
            Ok(()) => Err(DiscoveryError::WorkerLost(format!(
                "no report for '{}'",
                self.authority
            ))),
        }
    }

    pub async fn wait(self) -> Result<DiscoveryReport, DiscoveryError> {
        self.wait_with_progress(|_| {}).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prober::{InProcessProber, ProbeError};
    use crate::sink::{InMemorySink, SinkError};

    fn words(list: &[&str]) -> Vec<io::Result<String>> {
        list.iter().map(|w| Ok(w.to_string())).collect()
    }

    fn options(progress_interval: u64) -> DiscoveryOptions {
        DiscoveryOptions {
            progress_interval,
            ..DiscoveryOptions::default()
        }
    }

    /// Accepts one append, then fails every write after it.
    struct BrokenSink {
        remaining: usize,
    }

    impl ResultSink for BrokenSink {
        fn reset(&mut self) -> Result<(), SinkError> {
            Ok(())
        }
        fn append(&mut self, _identifier: &str) -> Result<(), SinkError> {
            if self.remaining == 0 {
                return Err(SinkError::Io("disk full".to_string()));
            }
            self.remaining -= 1;
            Ok(())
        }
        fn len(&self) -> usize {
            0
        }
    }

    struct UnopenableSink;

    impl ResultSink for UnopenableSink {
        fn reset(&mut self) -> Result<(), SinkError> {
            Err(SinkError::Io("read-only filesystem".to_string()))
        }
        fn append(&mut self, _identifier: &str) -> Result<(), SinkError> {
            unreachable!("append after failed reset")
        }
        fn len(&self) -> usize {
            0
        }
    }

    #[test]
    fn identifiers_use_scheme_authority_and_trimmed_word() {
        let job = DiscoveryJob::new("pkg.provider", DiscoveryOptions::default());
        assert_eq!(job.identifier_for("  users\t"), "content://pkg.provider/users");
        assert_eq!(job.identifier_for(""), "content://pkg.provider/");
        assert_eq!(job.state(), JobState::Idle);
    }

    #[test]
    fn accessible_entries_follow_wordlist_order_with_duplicates() {
        let job = DiscoveryJob::new("p", options(0));
        let mut prober = InProcessProber::new(|id: &str| {
            Ok(if id.ends_with("/x") || id.ends_with("/z") { 1 } else { 0 })
        });
        let mut sink = InMemorySink::new();
        let report = job.run(
            words(&["z", "a", "x", "z"]),
            &mut prober,
            &mut sink,
            &CancellationToken::new(),
            |_| {},
        );

        assert_eq!(report.state, JobState::Completed);
        assert_eq!(report.processed, 4);
        assert_eq!(
            report.accessible,
            vec!["content://p/z", "content://p/x", "content://p/z"]
        );
        assert_eq!(sink.entries(), report.accessible.as_slice());
    }

    #[test]
    fn failing_and_panicking_probes_do_not_stop_the_scan() {
        let job = DiscoveryJob::new("p", options(0));
        let mut prober = InProcessProber::new(|id: &str| match id.rsplit('/').next() {
            Some("boom") => panic!("provider crashed"),
            Some("denied") => Err(ProbeError::SecurityDenied("no".to_string())),
            Some("ok") => Ok(3),
            _ => Ok(0),
        });
        let mut sink = InMemorySink::new();
        let report = job.run(
            words(&["boom", "denied", "ok", "missing"]),
            &mut prober,
            &mut sink,
            &CancellationToken::new(),
            |_| {},
        );

        assert_eq!(report.state, JobState::Completed);
        assert_eq!(report.processed, 4);
        assert_eq!(report.accessible, vec!["content://p/ok"]);
    }

    #[test]
    fn progress_is_periodic_then_final() {
        let job = DiscoveryJob::new("p", options(2));
        let mut prober = InProcessProber::new(|_: &str| Ok(0));
        let mut sink = InMemorySink::new();
        let mut seen = Vec::new();
        let report = job.run(
            words(&["a", "b", "c", "d", "e"]),
            &mut prober,
            &mut sink,
            &CancellationToken::new(),
            |p| seen.push(p),
        );

        assert_eq!(report.processed, 5);
        let counts: Vec<(u64, bool)> = seen.iter().map(|p| (p.processed, p.done)).collect();
        assert_eq!(counts, vec![(2, false), (4, false), (5, true)]);
    }

    #[test]
    fn cancellation_stops_before_the_next_entry() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let job = DiscoveryJob::new("p", options(0));
        let mut prober = InProcessProber::new(move |id: &str| {
            if id.ends_with("/b") {
                trigger.cancel();
            }
            Ok(1)
        });
        let mut sink = InMemorySink::new();
        let report = job.run(
            words(&["a", "b", "c", "d", "e"]),
            &mut prober,
            &mut sink,
            &cancel,
            |_| {},
        );

        assert_eq!(report.state, JobState::Cancelled);
        assert_eq!(report.processed, 2);
        assert_eq!(report.accessible, vec!["content://p/a", "content://p/b"]);
    }

    #[test]
    fn cancelled_before_start_processes_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let job = DiscoveryJob::new("p", options(0));
        let mut prober = InProcessProber::new(|_: &str| -> Result<usize, ProbeError> {
            panic!("must not be probed")
        });
        let report = job.run(
            words(&["a"]),
            &mut prober,
            &mut InMemorySink::new(),
            &cancel,
            |_| {},
        );
        assert_eq!(report.state, JobState::Cancelled);
        assert_eq!(report.processed, 0);
    }

    #[test]
    fn sink_failure_fails_the_job_with_partial_results() {
        let job = DiscoveryJob::new("p", options(0));
        let mut prober = InProcessProber::new(|_: &str| Ok(1));
        let mut sink = BrokenSink { remaining: 1 };
        let report = job.run(
            words(&["a", "b", "c"]),
            &mut prober,
            &mut sink,
            &CancellationToken::new(),
            |_| {},
        );

        assert_eq!(report.state, JobState::Failed);
        assert_eq!(report.processed, 2);
        assert_eq!(report.accessible, vec!["content://p/a", "content://p/b"]);
        assert!(report.error.unwrap().contains("disk full"));
    }

    #[test]
    fn sink_that_cannot_open_fails_immediately() {
        let job = DiscoveryJob::new("p", options(0));
        let mut prober = InProcessProber::new(|_: &str| Ok(1));
        let mut progress = Vec::new();
        let report = job.run(
            words(&["a"]),
            &mut prober,
            &mut UnopenableSink,
            &CancellationToken::new(),
            |p| progress.push(p),
        );
        assert_eq!(report.state, JobState::Failed);
        assert_eq!(report.processed, 0);
        assert!(report.accessible.is_empty());
        assert_eq!(progress, vec![Progress { processed: 0, done: true }]);
    }

    #[test]
    fn badly_encoded_line_is_still_queried() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"a\ncaf\xe9\nb\nc\n").unwrap();
        let wordlist = Wordlist::File(file.path().to_path_buf());

        let job = DiscoveryJob::new("pkg.provider", options(0));
        let mut prober =
            InProcessProber::new(|id: &str| Ok(if id.ends_with("/b") { 1 } else { 0 }));
        let report = job.run(
            wordlist.entries().unwrap(),
            &mut prober,
            &mut InMemorySink::new(),
            &CancellationToken::new(),
            |_| {},
        );

        assert_eq!(report.state, JobState::Completed);
        assert_eq!(report.processed, 4);
        assert_eq!(report.accessible, vec!["content://pkg.provider/b"]);
    }

    #[test]
    fn io_error_mid_wordlist_fails_the_job() {
        let job = DiscoveryJob::new("p", options(0));
        let mut prober = InProcessProber::new(|_: &str| Ok(1));
        let entries = vec![
            Ok("a".to_string()),
            Err(io::Error::other("input/output error")),
            Ok("c".to_string()),
        ];
        let report = job.run(
            entries,
            &mut prober,
            &mut InMemorySink::new(),
            &CancellationToken::new(),
            |_| {},
        );
        assert_eq!(report.state, JobState::Failed);
        assert_eq!(report.processed, 1);
        assert_eq!(report.accessible, vec!["content://p/a"]);
    }

    #[test]
    fn starting_outside_a_runtime_is_an_error() {
        let engine = DiscoveryEngine::default();
        let result = engine.start_discovery(
            "p",
            Wordlist::from_words(["a"]),
            InMemorySink::new(),
            InProcessProber::new(|_: &str| Ok(0)),
        );
        assert!(matches!(result, Err(DiscoveryError::NoRuntime)));
        assert!(!engine.is_running("p"));
    }

    #[tokio::test]
    async fn duplicate_job_for_the_same_authority_is_rejected() {
        let engine = DiscoveryEngine::new(options(0));
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let blocking = InProcessProber::new(move |_: &str| {
            let _ = release_rx.recv();
            Ok(0)
        });

        let first = engine
            .start_discovery("p", Wordlist::from_words(["a"]), InMemorySink::new(), blocking)
            .unwrap();
        assert!(engine.is_running("p"));

        let second = engine.start_discovery(
            "p",
            Wordlist::from_words(["a"]),
            InMemorySink::new(),
            InProcessProber::new(|_: &str| Ok(0)),
        );
        assert!(matches!(second, Err(DiscoveryError::AlreadyRunning(a)) if a == "p"));

        // a different authority is independent
        let other = engine
            .start_discovery(
                "q",
                Wordlist::from_words(["a"]),
                InMemorySink::new(),
                InProcessProber::new(|_: &str| Ok(1)),
            )
            .unwrap();
        assert_eq!(other.wait().await.unwrap().accessible, vec!["content://q/a"]);

        release_tx.send(()).unwrap();
        let report = first.wait().await.unwrap();
        assert_eq!(report.state, JobState::Completed);
        assert!(!engine.is_running("p"));

        let again = engine
            .start_discovery(
                "p",
                Wordlist::from_words(["a"]),
                InMemorySink::new(),
                InProcessProber::new(|_: &str| Ok(0)),
            )
            .unwrap();
        assert_eq!(again.wait().await.unwrap().state, JobState::Completed);
    }

    #[tokio::test]
    async fn events_end_with_exactly_one_finished() {
        let engine = DiscoveryEngine::new(options(1));
        let mut handle = engine
            .start_discovery(
                "p",
                Wordlist::from_words(["a", "b", "c"]),
                InMemorySink::new(),
                InProcessProber::new(|_: &str| Ok(0)),
            )
            .unwrap();

        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            events.push(event);
        }

        let finished = events
            .iter()
            .filter(|e| matches!(e, DiscoveryEvent::Finished(_)))
            .count();
        assert_eq!(finished, 1);
        assert!(matches!(events.last(), Some(DiscoveryEvent::Finished(_))));

        let counts: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                DiscoveryEvent::Progress(p) => Some(p.processed),
                DiscoveryEvent::Finished(_) => None,
            })
            .collect();
        assert!(counts.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(counts.last(), Some(&3));
    }

    #[tokio::test]
    async fn missing_wordlist_is_reported_before_output_is_touched() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("found_paths.txt");
        std::fs::write(&output, "content://p/earlier\n").unwrap();

        let engine = DiscoveryEngine::default();
        let result = engine.start_discovery(
            "p",
            Wordlist::File("/definitely/not/here/words.txt".into()),
            crate::sink::FileSink::new(&output),
            InProcessProber::new(|_: &str| Ok(1)),
        );

        match result {
            Err(DiscoveryError::Wordlist { path, .. }) => {
                assert_eq!(path, Some("/definitely/not/here/words.txt".into()));
            }
            Err(other) => panic!("Expected a wordlist error, got {other:?}"),
            Ok(_) => panic!("Expected a wordlist error, got a running job"),
        }
        assert!(!engine.is_running("p"));
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "content://p/earlier\n"
        );
    }
}
