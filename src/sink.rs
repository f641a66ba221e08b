//! Result aggregation.
//!
//! A single task owns the console writer and the output file. Workers never
//! touch either; they send [`SinkMessage`]s through a cloneable
//! [`SinkHandle`]. Because only one task writes, every console and file line
//! is complete before the next one starts, without any shared lock.

use crate::error::{SinkError, SinkResult};
use crate::scanner::{PortStatus, ScanResult};
use crate::types::Port;
use std::io::Write;
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Maximum number of undelivered messages before senders wait.
pub const SINK_CAPACITY: usize = 1024;

/// Message delivered to the sink task.
#[derive(Debug, Clone)]
pub enum SinkMessage {
    /// A classified port from a worker.
    Result(ScanResult),
    /// A free-form console line from the orchestrator.
    Notice(String),
}

/// Totals accumulated by the sink over a whole scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkSummary {
    /// Open ports, ascending.
    pub open: Vec<Port>,
    pub refused: usize,
    pub timed_out: usize,
    /// Port lines appended to the output file (header excluded).
    pub lines_written: usize,
}

/// Sending side of the sink, one clone per worker.
#[derive(Debug, Clone)]
pub struct SinkHandle {
    tx: mpsc::Sender<SinkMessage>,
}

impl SinkHandle {
    /// Deliver a probe result.
    pub async fn report(&self, result: ScanResult) -> SinkResult<()> {
        self.send(SinkMessage::Result(result)).await
    }

    /// Print a line on the console, ordered with all other output.
    pub async fn notice(&self, line: impl Into<String>) -> SinkResult<()> {
        self.send(SinkMessage::Notice(line.into())).await
    }

    async fn send(&self, message: SinkMessage) -> SinkResult<()> {
        self.tx.send(message).await.map_err(|_| SinkError::Closed)
    }
}

/// The aggregating task.
pub struct ResultSink {
    task: JoinHandle<SinkResult<SinkSummary>>,
}

impl ResultSink {
    /// Start the sink.
    ///
    /// When `output` is given the file is opened for appending (created if
    /// missing) and `header` is written and flushed before this returns, so
    /// it always precedes every port line.
    pub async fn spawn<W>(
        console: W,
        output: Option<&Path>,
        header: &str,
    ) -> SinkResult<(Self, SinkHandle)>
    where
        W: Write + Send + 'static,
    {
        let file = match output {
            Some(path) => Some(open_with_header(path, header).await?),
            None => None,
        };

        let (tx, rx) = mpsc::channel(SINK_CAPACITY);
        let task = tokio::spawn(drain(rx, console, file));

        Ok((Self { task }, SinkHandle { tx }))
    }

    /// Wait for the sink to process every queued message.
    ///
    /// Returns once all [`SinkHandle`]s have been dropped.
    pub async fn finish(self) -> SinkResult<SinkSummary> {
        self.task.await.map_err(|e| {
            tracing::warn!(error = %e, "result sink task failed");
            SinkError::Closed
        })?
    }
}

async fn open_with_header(path: &Path, header: &str) -> SinkResult<File> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(format!("{header}\n").as_bytes()).await?;
    file.flush().await?;
    Ok(file)
}

async fn drain<W: Write>(
    mut rx: mpsc::Receiver<SinkMessage>,
    mut console: W,
    mut file: Option<File>,
) -> SinkResult<SinkSummary> {
    let mut summary = SinkSummary::default();

    while let Some(message) = rx.recv().await {
        let result = match message {
            SinkMessage::Notice(line) => {
                print_line(&mut console, &line);
                continue;
            }
            SinkMessage::Result(result) => result,
        };

        match result.status {
            PortStatus::Open => {
                let line = format!("{} OPEN", result.port);
                print_line(&mut console, &line);
                if let Some(file) = file.as_mut() {
                    file.write_all(format!("{line}\n").as_bytes()).await?;
                    file.flush().await?;
                    summary.lines_written += 1;
                }
                summary.open.push(result.port);
            }
            PortStatus::Refused => {
                print_line(
                    &mut console,
                    &format!("connection refused by server on port {}", result.port),
                );
                summary.refused += 1;
            }
            PortStatus::Timeout => summary.timed_out += 1,
        }
    }

    if let Err(e) = console.flush() {
        tracing::warn!(error = %e, "failed to flush console");
    }
    summary.open.sort_unstable();
    Ok(summary)
}

// Console failures (e.g. a closed pipe) must not stop the file from being written.
fn print_line<W: Write>(console: &mut W, line: &str) {
    if let Err(e) = writeln!(console, "{line}") {
        tracing::warn!(error = %e, "failed to write console line");
    }
}
