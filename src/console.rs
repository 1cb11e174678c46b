use crate::record::{Level, LogRecord};
use crate::sink::LogSink;
use async_trait::async_trait;
use colored::{ColoredString, Colorize};
use std::error::Error;
use std::io::Write;

/// Header of a record colored by its level.
pub fn colored_header(record: &LogRecord) -> ColoredString {
    let header = record.header();
    match record.level {
        Level::Debug => header.cyan(),
        Level::Info => header.green(),
        Level::Warn => header.yellow(),
        Level::Error => header.red(),
    }
}

/// Console sink writing one line per record to stdout.
///
/// The bracketed header is colored by level (DEBUG cyan, INFO green, WARN
/// yellow, ERROR red) and the color is reset before the message. Record
/// details (error chains) go to stderr uncolored. Coloring also follows
/// `colored`'s global switches (`NO_COLOR`, `CLICOLOR_FORCE`, terminal
/// detection).
#[derive(Clone, Debug)]
pub struct ConsoleSink {
    colored: bool,
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self { colored: true }
    }
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A console sink without ANSI escapes, for CI logs that do not render them.
    pub fn plain() -> Self {
        Self { colored: false }
    }

    pub fn render(&self, record: &LogRecord) -> String {
        if self.colored {
            format!("{} {}", colored_header(record), record.body())
        } else {
            record.render_line()
        }
    }
}

#[async_trait]
impl LogSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, record: &LogRecord) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut line = self.render(record);
        line.push('\n');

        // A single locked write keeps lines from concurrent loggers whole.
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        out.write_all(line.as_bytes())?;
        out.flush()?;
        drop(out);

        if let Some(detail) = &record.detail {
            let stderr = std::io::stderr();
            let mut err = stderr.lock();
            err.write_all(format!("{}\n", detail).as_bytes())?;
        }
        Ok(())
    }
}
