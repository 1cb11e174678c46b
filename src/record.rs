use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Severity of a [`LogRecord`]. Ordered `Debug < Info < Warn < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARN" | "WARNING" => Ok(Level::Warn),
            "ERROR" => Ok(Level::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// A single, fully formed log entry produced by a [`Logger`](crate::logger::Logger).
///
/// Records are never mutated after construction; every sink receives the
/// same value.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    /// Producer identity: a page object, API client or test title.
    pub context: String,
    pub message: String,
    pub args: Vec<serde_json::Value>,
    /// Extra text written on the lines following the record, e.g. an
    /// error and its source chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl LogRecord {
    pub fn new(
        level: Level,
        context: impl Into<String>,
        message: impl Into<String>,
        args: Vec<serde_json::Value>,
    ) -> Self {
        LogRecord {
            timestamp: Utc::now(),
            level,
            context: context.into(),
            message: message.into(),
            args,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// ISO-8601 timestamp with millisecond precision, e.g.
    /// `2024-05-01T12:00:00.123Z`.
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// `[<ts>] [<LEVEL>] [<context>]`, shared by the console and file layouts.
    ///
    /// `]` and `\` in the context are backslash-escaped so the header can
    /// always be split off again by [`ParsedLine::parse`].
    pub fn header(&self) -> String {
        format!(
            "[{}] [{}] [{}]",
            self.timestamp_iso(),
            self.level,
            escape_context(&self.context)
        )
    }

    /// Message followed by the serialized structured args.
    pub fn body(&self) -> String {
        let args = render_args(&self.args);
        if args.is_empty() {
            self.message.clone()
        } else {
            format!("{} {}", self.message, args)
        }
    }

    /// The plain-text line layout used by the per-day log file:
    /// `[<ISO timestamp>] [<LEVEL>] [<context>] <message> <serialized args>`.
    pub fn render_line(&self) -> String {
        format!("{} {}", self.header(), self.body())
    }

    /// [`render_line`](Self::render_line) followed by the detail lines, if any.
    pub fn render_plain(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{}\n{}", self.render_line(), detail),
            None => self.render_line(),
        }
    }
}

/// Serialize structured args one by one and join them with a space.
///
/// Objects and arrays become compact JSON; strings are written as-is and
/// other scalars use their JSON text form.
pub fn render_args(args: &[serde_json::Value]) -> String {
    args.iter().map(render_arg).collect::<Vec<_>>().join(" ")
}

pub fn render_arg(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape_context(context: &str) -> Cow<'_, str> {
    if !context.contains(['\\', ']']) {
        return Cow::Borrowed(context);
    }
    let mut out = String::with_capacity(context.len() + 2);
    for c in context.chars() {
        if c == '\\' || c == ']' {
            out.push('\\');
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Read an escaped context up to its closing `]`, returning it and the rest
/// of the line after the bracket.
fn unescape_context(input: &str) -> Option<(String, &str)> {
    let mut context = String::new();
    let mut chars = input.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => context.push(chars.next()?.1),
            ']' => return Some((context, &input[idx + 1..])),
            other => context.push(other),
        }
    }
    None
}

/// Structural fields recovered from one rendered log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub context: String,
    /// Everything after the header: message plus rendered args.
    pub message: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LineParseError {
    #[error("line does not start with a bracketed header")]
    MissingHeader,
    #[error("invalid timestamp: {0}")]
    Timestamp(String),
    #[error(transparent)]
    Level(#[from] ParseLevelError),
}

impl ParsedLine {
    /// Parse the first line of a file-sink record back into its structure.
    pub fn parse(line: &str) -> Result<Self, LineParseError> {
        let line = line.lines().next().unwrap_or_default();
        let rest = line.strip_prefix('[').ok_or(LineParseError::MissingHeader)?;
        let (ts, rest) = rest.split_once("] [").ok_or(LineParseError::MissingHeader)?;
        let (level, rest) = rest.split_once("] [").ok_or(LineParseError::MissingHeader)?;
        let (context, rest) = unescape_context(rest).ok_or(LineParseError::MissingHeader)?;
        let message = rest.strip_prefix(' ').unwrap_or(rest);

        let timestamp = DateTime::parse_from_rfc3339(ts)
            .map_err(|_| LineParseError::Timestamp(ts.to_string()))?
            .with_timezone(&Utc);

        Ok(ParsedLine {
            timestamp,
            level: level.parse()?,
            context,
            message: message.to_string(),
        })
    }
}
