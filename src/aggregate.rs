// src/aggregate.rs

//! Fan-in of many output streams into one tagged line feed.
//!
//! Each registered stream gets its own reader task that splits it into lines
//! and pushes [`TaggedLine`]s into one shared bounded queue. When the queue is
//! full, readers wait (backpressure, nothing is dropped). A coordinator task
//! waits for every reader to finish, collects their read errors and then
//! closes the queue, which is the consumer's only "aggregation ended" signal.
//!
//! Ordering: lines of one stream arrive in the order they were written; lines
//! of different streams interleave in arrival order.

use std::fmt;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

use crate::errors::StreamReadError;

/// Capacity of the shared line queue unless configured otherwise.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Any readable byte stream that can be handed to a reader task.
pub type LineSource = Box<dyn AsyncRead + Send + Unpin>;

/// A stream plus the label its lines are tagged with.
pub struct LabeledStream {
    pub label: String,
    pub reader: LineSource,
}

impl LabeledStream {
    pub fn new(label: impl Into<String>, reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            label: label.into(),
            reader: Box::new(reader),
        }
    }
}

impl fmt::Debug for LabeledStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabeledStream")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// One output line annotated with the label of its stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedLine {
    pub label: String,
    pub text: String,
}

impl fmt::Display for TaggedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.label, self.text)
    }
}

/// How a reader task stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamEnd {
    Eof,
    /// The consumer dropped the queue; remaining input was not read.
    ConsumerGone,
}

/// Consumer side of a running aggregation.
#[derive(Debug)]
pub struct Aggregation {
    lines: mpsc::Receiver<TaggedLine>,
    coordinator: JoinHandle<Vec<StreamReadError>>,
}

impl Aggregation {
    /// Next line, or `None` once every stream is done.
    pub async fn recv(&mut self) -> Option<TaggedLine> {
        self.lines.recv().await
    }

    /// Wait for the coordinator and return the stream read errors.
    ///
    /// Lines not yet received are discarded and readers still running stop at
    /// their next line. Use [`Aggregation::drain`] to consume everything
    /// first.
    pub async fn finish(self) -> Vec<StreamReadError> {
        drop(self.lines);
        match self.coordinator.await {
            Ok(errors) => errors,
            Err(e) => {
                warn!(error = %e, "aggregation coordinator failed");
                Vec::new()
            }
        }
    }

    /// Hand every line to `sink` until the queue closes, then finish.
    pub async fn drain(mut self, mut sink: impl FnMut(TaggedLine)) -> Vec<StreamReadError> {
        while let Some(line) = self.lines.recv().await {
            sink(line);
        }
        self.finish().await
    }

    /// Collect all lines and read errors.
    pub async fn collect(self) -> (Vec<TaggedLine>, Vec<StreamReadError>) {
        let mut lines = Vec::new();
        let errors = self.drain(|line| lines.push(line)).await;
        (lines, errors)
    }
}

/// Start one reader per stream, all feeding a queue of `capacity` lines.
///
/// Returns `None` without creating a queue when `sources` is empty. Must be
/// called from within a Tokio runtime.
pub fn aggregate_lines(sources: Vec<LabeledStream>, capacity: usize) -> Option<Aggregation> {
    if sources.is_empty() {
        return None;
    }

    let (tx, rx) = mpsc::channel::<TaggedLine>(capacity.max(1));
    let stream_count = sources.len();

    let mut readers = JoinSet::new();
    for LabeledStream { label, reader } in sources {
        readers.spawn(read_stream(label, reader, tx.clone()));
    }

    let coordinator = tokio::spawn(async move {
        let mut errors = Vec::new();
        while let Some(joined) = readers.join_next().await {
            match joined {
                Ok(Ok(StreamEnd::Eof)) => {}
                Ok(Ok(StreamEnd::ConsumerGone)) => {
                    debug!("line consumer went away; reader stopped early");
                }
                Ok(Err(err)) => errors.push(err),
                Err(e) => warn!(error = %e, "stream reader task failed"),
            }
        }

        debug!(
            streams = stream_count,
            read_errors = errors.len(),
            "all streams done; closing line queue"
        );
        drop(tx);
        errors
    });

    Some(Aggregation {
        lines: rx,
        coordinator,
    })
}

async fn read_stream(
    label: String,
    reader: LineSource,
    tx: mpsc::Sender<TaggedLine>,
) -> Result<StreamEnd, StreamReadError> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => {
                debug!(%label, "stream reached EOF");
                return Ok(StreamEnd::Eof);
            }
            Ok(_) => {
                let line = TaggedLine {
                    label: label.clone(),
                    text: line_text(&buf),
                };
                if tx.send(line).await.is_err() {
                    return Ok(StreamEnd::ConsumerGone);
                }
            }
            Err(source) => {
                warn!(%label, error = %source, "stream read failed; reader stopping");
                return Err(StreamReadError { label, source });
            }
        }
    }
}

/// Strip the line terminator (`\n` or `\r\n`) and decode lossily.
fn line_text(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
