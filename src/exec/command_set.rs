// src/exec/command_set.rs

//! Handle over every process launched in one run.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::process::{ChildStderr, ChildStdout};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::aggregate::{Aggregation, LabeledStream, aggregate_lines};
use crate::errors::ProcessExitError;
use crate::exec::latch::CountdownLatch;

/// Shared, append-only list of exit failures, in the order processes exited.
pub(crate) type ErrorSink = Arc<Mutex<Vec<ProcessExitError>>>;

/// A launched child process as seen by the rest of the run.
///
/// The OS handle itself lives in the process's wait task; this keeps what the
/// caller needs: identity and the not-yet-consumed output streams.
#[derive(Debug)]
pub struct ChildProcess {
    label: String,
    command_line: String,
    original_args: Vec<String>,
    pid: Option<u32>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
}

impl ChildProcess {
    pub(crate) fn new(
        label: String,
        command_line: String,
        original_args: Vec<String>,
        pid: Option<u32>,
        stdout: ChildStdout,
        stderr: ChildStderr,
    ) -> Self {
        Self {
            label,
            command_line,
            original_args,
            pid,
            stdout: Some(stdout),
            stderr: Some(stderr),
        }
    }

    /// Label without the `(stdout)` / `(stderr)` suffix.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn original_args(&self) -> &[String] {
        &self.original_args
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Take the output streams, labelled `"<label> (stdout)"` and
    /// `"<label> (stderr)"`. Empty on the second call.
    pub fn take_streams(&mut self) -> Vec<LabeledStream> {
        let mut streams = Vec::with_capacity(2);
        if let Some(stdout) = self.stdout.take() {
            streams.push(LabeledStream::new(format!("{} (stdout)", self.label), stdout));
        }
        if let Some(stderr) = self.stderr.take() {
            streams.push(LabeledStream::new(format!("{} (stderr)", self.label), stderr));
        }
        streams
    }
}

/// Launched processes, their completion signal and their exit failures.
///
/// Produced by [`crate::exec::launch_commands`]. The completion signal fires
/// once every process in the set has exited; [`CommandSet::wait`] consumes
/// the set, so it can only be awaited once.
#[derive(Debug)]
pub struct CommandSet {
    processes: Vec<ChildProcess>,
    latch: CountdownLatch,
    done: oneshot::Receiver<()>,
    errors: ErrorSink,
}

impl CommandSet {
    /// New set holding one latch count for the launcher itself, released by
    /// [`CommandSet::seal`]. This way a process exiting while later ones are
    /// still being launched cannot fire completion early.
    pub(crate) fn new() -> Self {
        let (latch, done) = CountdownLatch::new(1);
        Self {
            processes: Vec::new(),
            latch,
            done,
            errors: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn latch(&self) -> &CountdownLatch {
        &self.latch
    }

    pub(crate) fn error_sink(&self) -> ErrorSink {
        Arc::clone(&self.errors)
    }

    pub(crate) fn push(&mut self, process: ChildProcess) {
        self.processes.push(process);
    }

    /// Release the launcher's latch count. Called once, after the last launch.
    pub(crate) fn seal(&self) {
        self.latch.count_down();
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Processes in launch order.
    pub fn processes(&self) -> &[ChildProcess] {
        &self.processes
    }

    /// Number of processes that have exited unsuccessfully so far.
    pub fn failure_count(&self) -> usize {
        self.errors.lock().len()
    }

    /// Take every process's output streams, two per process.
    pub fn take_streams(&mut self) -> Vec<LabeledStream> {
        self.processes
            .iter_mut()
            .flat_map(ChildProcess::take_streams)
            .collect()
    }

    /// Start aggregating all output streams into one tagged feed.
    ///
    /// Returns `None` if there is nothing to aggregate (no processes, or the
    /// streams were already taken).
    pub fn aggregate(&mut self, capacity: usize) -> Option<Aggregation> {
        let streams = self.take_streams();
        debug!(streams = streams.len(), "starting output aggregation");
        aggregate_lines(streams, capacity)
    }

    /// Wait until every launched process has exited and return the exit
    /// failures in the order they happened.
    ///
    /// Output streams that were never taken are closed first, so a process
    /// cannot block forever on a full pipe nobody reads.
    pub async fn wait(self) -> Vec<ProcessExitError> {
        let CommandSet {
            processes,
            latch,
            done,
            errors,
        } = self;
        drop(processes);

        debug!(pending = latch.count(), "waiting for launched processes");
        if done.await.is_err() {
            warn!("completion signal dropped before every process exited");
        }

        std::mem::take(&mut *errors.lock())
    }
}
