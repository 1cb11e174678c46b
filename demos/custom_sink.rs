use std::sync::Arc;

use async_trait::async_trait;
use e2e_log_sink::{Level, LogRecord, LogSink, Logger, LoggerConfig};

/// Example of plugging in a completely custom destination by implementing
/// [`LogSink`] directly. Imagine this posts to a chat webhook; here it
/// only prints warnings and errors.
struct AlertSink;

#[async_trait]
impl LogSink for AlertSink {
    fn name(&self) -> &str {
        "alerts"
    }

    async fn send(&self, record: &LogRecord) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if record.level >= Level::Warn {
            println!("[alert] {}", record.render_plain());
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let config = LoggerConfig::new(Level::Debug).with_sink(Arc::new(AlertSink));
    let logger = Logger::new("custom-sink", config);

    logger.info("custom sink example started");
    logger.warn("Response time 1200ms exceeds maximum 500ms");
    logger.child("LoansPage").error("loan form never became visible");

    logger.flush().await;
}
