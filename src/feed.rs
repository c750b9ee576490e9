//! NDJSON result feed
//!
//! Reads result batches from a line-oriented reader on a dedicated thread and
//! hands them to the consumer through a bounded channel. Each non-blank line
//! is one batch: either a JSON array of results or a single result object.
//!
//! The channel closes when the reader hits EOF, when a line fails to parse,
//! when cancellation is requested, or when the consumer goes away. Whatever
//! the reason, the consumer simply sees the end of the stream; the reason is
//! reported through the join handle.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use goss_result::{ResultBatch, TestResult};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::signal::SignalState;

/// Default number of batches buffered between feed and consumer
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// One input line
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BatchLine {
    Many(Vec<TestResult>),
    One(Box<TestResult>),
}

impl BatchLine {
    fn into_batch(self) -> ResultBatch {
        match self {
            BatchLine::Many(results) => results,
            BatchLine::One(result) => vec![*result],
        }
    }
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ResultBatch>, serde_json::Error> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let parsed: BatchLine = serde_json::from_str(line)?;
    Ok(Some(parsed.into_batch()))
}

/// What the feed thread did before it stopped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Lines read, including blank ones
    pub lines: usize,
    /// Batches sent to the consumer
    pub batches: usize,
    /// Results sent to the consumer
    pub results: usize,
    /// Stopped early because cancellation was requested
    pub cancelled: bool,
    /// Stopped early because the consumer hung up
    pub disconnected: bool,
}

/// Error while feeding results
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Reading the input failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line was not a result or an array of results
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The feed thread panicked
    #[error("Feed thread panicked")]
    Panicked,
}

/// A running feed
#[derive(Debug)]
pub struct Feed {
    receiver: Receiver<ResultBatch>,
    handle: JoinHandle<Result<FeedStats, FeedError>>,
}

impl Feed {
    /// Start reading `reader` on a new thread.
    ///
    /// At most `capacity` batches are buffered; the feed blocks once the
    /// buffer is full until the consumer catches up.
    pub fn spawn<R>(reader: R, capacity: usize, signals: Arc<SignalState>) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, receiver) = mpsc::sync_channel(capacity.max(1));
        let handle = thread::spawn(move || -> Result<FeedStats, FeedError> {
            let mut stats = FeedStats::default();
            for line in reader.lines() {
                if signals.is_cancel_requested() {
                    stats.cancelled = true;
                    break;
                }
                let line = line?;
                stats.lines += 1;

                let batch = match parse_line(&line) {
                    Ok(Some(batch)) => batch,
                    Ok(None) => continue,
                    Err(e) => {
                        return Err(FeedError::Parse {
                            line: stats.lines,
                            message: e.to_string(),
                        })
                    }
                };

                let size = batch.len();
                if tx.send(batch).is_err() {
                    warn!(line = stats.lines, "consumer hung up, stopping feed");
                    stats.disconnected = true;
                    break;
                }
                stats.batches += 1;
                stats.results += size;
            }
            debug!(?stats, "feed finished");
            Ok(stats)
        });

        Self { receiver, handle }
    }

    /// Split into the consumer side and the thread handle
    pub fn into_parts(self) -> (Receiver<ResultBatch>, FeedHandle) {
        (self.receiver, FeedHandle(self.handle))
    }
}

/// Join handle for the feed thread
#[derive(Debug)]
pub struct FeedHandle(JoinHandle<Result<FeedStats, FeedError>>);

impl FeedHandle {
    /// Wait for the feed thread and return its outcome
    pub fn join(self) -> Result<FeedStats, FeedError> {
        self.0.join().map_err(|_| FeedError::Panicked)?
    }
}
