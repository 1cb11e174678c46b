use crate::record::LogRecord;
use async_trait::async_trait;
use std::error::Error;

/// Asynchronous destination for [`LogRecord`]s produced by a
/// [`Logger`](crate::logger::Logger).
///
/// Implementations render a record to a concrete destination (console,
/// per-day file, ReportPortal, memory). The dispatcher calls `send` from
/// its background task in the order records were logged, one record at a
/// time, and never awaits it on the test's own call path.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Short label used when reporting a failure of this sink.
    fn name(&self) -> &str;

    /// Write a single record.
    ///
    /// **Returns**
    /// - `Ok(())` if the record was fully written.
    /// - `Err(..)` if the destination failed. The dispatcher reports the
    ///   failure to the remaining sinks and moves on; records are not
    ///   retried.
    ///
    /// A record must either be written completely or not at all.
    async fn send(&self, record: &LogRecord) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush any buffered records, if the destination buffers.
    ///
    /// Default implementation is a no-op.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
