use crate::dispatch::{DispatchHandle, StatsSnapshot};
use crate::record::{Level, LogRecord};
use crate::sink::LogSink;
use serde_json::Value;
use std::error::Error;
use std::fmt::Display;
use std::sync::Arc;

const BANNER: &str = "═══════════════════════════════════════════════════";

/// Configuration read once when a [`Logger`] is constructed.
///
/// **Fields**
/// - `min_level`: records below this level are discarded, except ERROR,
///   which is always written.
/// - `sinks`: destinations, written in registration order.
#[derive(Clone)]
pub struct LoggerConfig {
    pub min_level: Level,
    pub sinks: Vec<Arc<dyn LogSink>>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: Level::Info,
            sinks: Vec::new(),
        }
    }
}

impl LoggerConfig {
    pub fn new(min_level: Level) -> Self {
        Self {
            min_level,
            ..Self::default()
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_sinks(mut self, sinks: impl IntoIterator<Item = Arc<dyn LogSink>>) -> Self {
        self.sinks.extend(sinks);
        self
    }
}

/// Per-context leveled logger with domain helpers for test narration.
///
/// Every call formats a [`LogRecord`] and hands it to a background
/// dispatcher that writes it to each sink in order. Logging calls never
/// wait on sink I/O and never fail.
///
/// Loggers created with [`child`](Self::child) share the dispatcher, so
/// records from a test and its page objects stay in call order.
#[derive(Clone)]
pub struct Logger {
    context: String,
    min_level: Level,
    dispatch: DispatchHandle,
}

impl Logger {
    /// Create a logger and spawn its dispatcher.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(context: impl Into<String>, config: LoggerConfig) -> Self {
        let (dispatch, _task) = DispatchHandle::spawn(config.sinks);
        Self {
            context: context.into(),
            min_level: config.min_level,
            dispatch,
        }
    }

    /// A logger with a different context writing through the same dispatcher.
    pub fn child(&self, context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            min_level: self.min_level,
            dispatch: self.dispatch.clone(),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    /// Whether a record at `level` would be written.
    pub fn enabled(&self, level: Level) -> bool {
        level == Level::Error || level >= self.min_level
    }

    pub fn log(&self, level: Level, message: impl Into<String>, args: Vec<Value>) {
        if !self.enabled(level) {
            return;
        }
        self.submit(LogRecord::new(level, self.context.as_str(), message, args));
    }

    fn submit(&self, record: LogRecord) {
        self.dispatch.submit(record);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message, Vec::new());
    }

    pub fn debug_with(&self, message: impl Into<String>, args: Vec<Value>) {
        self.log(Level::Debug, message, args);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message, Vec::new());
    }

    pub fn info_with(&self, message: impl Into<String>, args: Vec<Value>) {
        self.log(Level::Info, message, args);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::Warn, message, Vec::new());
    }

    pub fn warn_with(&self, message: impl Into<String>, args: Vec<Value>) {
        self.log(Level::Warn, message, args);
    }

    /// Written regardless of the configured minimum level.
    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message, Vec::new());
    }

    pub fn error_with(&self, message: impl Into<String>, args: Vec<Value>) {
        self.log(Level::Error, message, args);
    }

    /// ERROR record followed by `err` and its `source()` chain, one per line.
    pub fn error_cause(&self, message: impl Into<String>, err: &(dyn Error + 'static), args: Vec<Value>) {
        let record = LogRecord::new(Level::Error, self.context.as_str(), message, args)
            .with_detail(error_chain(err));
        self.submit(record);
    }

    /// Banner-formatted INFO record marking a logical test step.
    pub fn step(&self, step_number: u32, description: impl Display) {
        self.info(format!(
            "{BANNER}\nStep {step_number}: {description}\n{BANNER}"
        ));
    }

    /// Outbound HTTP call.
    pub fn api_request(&self, method: impl Display, url: &str, data: Option<&Value>) {
        self.info(format!("🌐 {} {}", method, url));
        if let Some(data) = data {
            self.info_with("📦 Request Data:", vec![data.clone()]);
        }
    }

    /// Inbound HTTP result, logged at INFO, WARN (3xx) or ERROR (4xx and up).
    pub fn api_response(&self, status: u16, body: Option<&Value>) {
        let level = response_level(status);
        self.log(level, format!("📨 Response Status: {}", status), Vec::new());
        if let Some(body) = body {
            self.log(level, "📄 Response:", vec![body.clone()]);
        }
    }

    pub fn ui_action(&self, action: impl Display, element: Option<&str>, value: Option<&str>) {
        let mut message = format!("🖱️  {}", action);
        if let Some(element) = element {
            message.push_str(&format!(" on \"{}\"", element));
        }
        if let Some(value) = value {
            message.push_str(&format!(" with value: {}", value));
        }
        self.info(message);
    }

    /// Narrate an assertion whether or not it passes.
    pub fn verification(&self, description: impl Display, expected: impl Display, actual: impl Display) {
        self.info(format!("✅ {}", description));
        self.debug(format!("   Expected: {}", expected));
        self.debug(format!("   Actual: {}", actual));
    }

    /// Wait until everything logged so far has been written and every sink
    /// flushed.
    pub async fn flush(&self) {
        self.dispatch.flush().await;
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.dispatch.stats()
    }
}

/// Level used for a response with `status`.
pub fn response_level(status: u16) -> Level {
    if status >= 400 {
        Level::Error
    } else if status >= 300 {
        Level::Warn
    } else {
        Level::Info
    }
}

fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut lines = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {}", cause));
        source = cause.source();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_sink::MemorySink;
    use serde_json::json;

    fn logger_with(min_level: Level) -> (Logger, MemorySink) {
        let memory = MemorySink::new();
        let config = LoggerConfig::new(min_level).with_sink(Arc::new(memory.clone()));
        (Logger::new("unit", config), memory)
    }

    #[tokio::test]
    async fn below_minimum_is_discarded_but_error_is_not() {
        let (logger, memory) = logger_with(Level::Error);
        logger.debug("d");
        logger.info("i");
        logger.warn("w");
        logger.error("e");
        logger.flush().await;

        let records = memory.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Error);
        assert_eq!(records[0].message, "e");
    }

    #[tokio::test]
    async fn step_is_a_banner() {
        let (logger, memory) = logger_with(Level::Info);
        logger.step(3, "Submit loan application");
        logger.flush().await;

        let message = &memory.records()[0].message;
        let lines: Vec<_> = message.lines().collect();
        assert_eq!(lines, vec![BANNER, "Step 3: Submit loan application", BANNER]);
    }

    #[tokio::test]
    async fn api_response_level_follows_status() {
        let (logger, memory) = logger_with(Level::Debug);
        logger.api_response(200, None);
        logger.api_response(302, None);
        logger.api_response(404, Some(&json!({"error": "missing"})));
        logger.flush().await;

        let levels: Vec<_> = memory.records().iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![Level::Info, Level::Warn, Level::Error, Level::Error]);
        assert_eq!(memory.records()[3].args, vec![json!({"error": "missing"})]);
    }

    #[tokio::test]
    async fn api_request_logs_payload_separately() {
        let (logger, memory) = logger_with(Level::Info);
        logger.api_request("POST", "/posts", Some(&json!({"title": "t"})));
        logger.api_request("GET", "/posts/1", None);
        logger.flush().await;

        let lines = memory.lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("🌐 POST /posts"));
        assert!(lines[1].ends_with(r#"📦 Request Data: {"title":"t"}"#));
        assert!(lines[2].ends_with("🌐 GET /posts/1"));
    }

    #[tokio::test]
    async fn ui_action_mentions_element_and_value() {
        let (logger, memory) = logger_with(Level::Info);
        logger.ui_action("Type", Some("#username"), Some("alice"));
        logger.ui_action("Click", None, None);
        logger.flush().await;

        let records = memory.records();
        assert_eq!(records[0].message, "🖱️  Type on \"#username\" with value: alice");
        assert_eq!(records[1].message, "🖱️  Click");
    }

    #[tokio::test]
    async fn verification_emits_info_and_two_debug_records() {
        let (logger, memory) = logger_with(Level::Debug);
        logger.verification("Title matches", "Loans", "Loans");
        logger.flush().await;

        let levels: Vec<_> = memory.records().iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![Level::Info, Level::Debug, Level::Debug]);
    }

    #[tokio::test]
    async fn error_cause_carries_the_source_chain() {
        #[derive(thiserror::Error, Debug)]
        #[error("request failed")]
        struct Outer(#[source] std::io::Error);

        let (logger, memory) = logger_with(Level::Info);
        let err = Outer(std::io::Error::new(std::io::ErrorKind::Other, "connection reset"));
        logger.error_cause("call failed", &err, vec![]);
        logger.flush().await;

        let detail = memory.records()[0].detail.clone().unwrap();
        assert_eq!(detail, "request failed\ncaused by: connection reset");
    }

    #[tokio::test]
    async fn children_share_the_dispatcher() {
        let (logger, memory) = logger_with(Level::Info);
        let page = logger.child("LoginPage");
        logger.info("first");
        page.info("second");
        logger.flush().await;

        let contexts: Vec<_> = memory.records().into_iter().map(|r| r.context).collect();
        assert_eq!(contexts, vec!["unit", "LoginPage"]);
    }
}
