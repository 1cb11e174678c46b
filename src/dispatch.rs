use crate::error::SinkFailure;
use crate::record::{Level, LogRecord};
use crate::sink::LogSink;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Context attached to records describing a failing sink.
pub const SINK_FAILURE_CONTEXT: &str = "log-sink";

pub(crate) enum Command {
    Record(LogRecord),
    Flush(oneshot::Sender<()>),
}

/// Counters shared between a dispatcher and its handles.
#[derive(Debug, Default)]
pub struct DispatchStats {
    /// Records accepted into the channel.
    pub enqueued: AtomicU64,
    /// Records dropped because the dispatcher had already stopped.
    pub dropped: AtomicU64,
    /// Individual sink writes that failed.
    pub sink_failures: AtomicU64,
}

/// Point-in-time copy of [`DispatchStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub enqueued: u64,
    pub dropped: u64,
    pub sink_failures: u64,
}

impl DispatchStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
        }
    }
}

/// Sending half of a dispatcher. Cheap to clone; the background task
/// exits once every handle is dropped and the queue is drained.
///
/// The queue is unbounded: a record accepted by a logger is never
/// discarded for lack of space, and submitting never waits on sink I/O.
#[derive(Clone)]
pub(crate) struct DispatchHandle {
    sender: mpsc::UnboundedSender<Command>,
    stats: Arc<DispatchStats>,
}

impl DispatchHandle {
    /// Spawn the background task that feeds `sinks` in submission order.
    ///
    /// Must be called from within a Tokio runtime.
    pub(crate) fn spawn(sinks: Vec<Arc<dyn LogSink>>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Command>();
        let stats = Arc::new(DispatchStats::default());
        let stats_bg = Arc::clone(&stats);

        let handle = tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    Command::Record(record) => {
                        dispatch_record(&sinks, &record, &stats_bg).await;
                    }
                    Command::Flush(ack) => {
                        for sink in &sinks {
                            if let Err(e) = sink.flush().await {
                                tracing::warn!(sink = sink.name(), error = %e, "log sink flush failed");
                            }
                        }
                        let _ = ack.send(());
                    }
                }
            }
            tracing::debug!("log dispatcher stopped");
        });

        (Self { sender: tx, stats }, handle)
    }

    pub(crate) fn submit(&self, record: LogRecord) {
        match self.sender.send(Command::Record(record)) {
            Ok(()) => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("log dispatcher stopped, dropping log record");
            }
        }
    }

    /// Wait until every record submitted so far has reached the sinks and
    /// every sink has been flushed.
    pub(crate) async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.sender.send(Command::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    pub(crate) fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

/// Write `record` to every sink in registration order.
///
/// A failing sink never aborts the fan-out: the failure is described in a
/// WARN record sent to every other sink, and errors from that report are
/// dropped.
async fn dispatch_record(sinks: &[Arc<dyn LogSink>], record: &LogRecord, stats: &DispatchStats) {
    for (idx, sink) in sinks.iter().enumerate() {
        let Err(source) = sink.send(record).await else {
            continue;
        };
        stats.sink_failures.fetch_add(1, Ordering::Relaxed);

        let failure = SinkFailure {
            sink: sink.name().to_string(),
            source,
        };
        tracing::warn!(error = %failure, "log sink write failed");

        let report = LogRecord::new(Level::Warn, SINK_FAILURE_CONTEXT, failure.to_string(), vec![]);
        for (other_idx, other) in sinks.iter().enumerate() {
            if other_idx != idx {
                let _ = other.send(&report).await;
            }
        }
    }
}
