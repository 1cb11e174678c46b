use crate::record::LogRecord;
use crate::sink::LogSink;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Append-only sink writing one UTF-8 text file per calendar day.
///
/// Files are named `test-execution-<YYYY-MM-DD>.log` after the record's
/// UTC date and live under a fixed directory, which is created on demand.
/// Each record, including its detail lines, is appended with a single
/// write so that concurrent test processes sharing the file never
/// interleave mid-line.
#[derive(Clone, Debug)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the log file that records dated `day` are appended to.
    pub fn file_for(&self, day: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("test-execution-{}.log", day.format("%Y-%m-%d")))
    }
}

#[async_trait]
impl LogSink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    async fn send(&self, record: &LogRecord) -> Result<(), Box<dyn Error + Send + Sync>> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.file_for(record.timestamp.date_naive());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        let mut buf = record.render_plain();
        buf.push('\n');
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Level, ParsedLine};

    #[tokio::test]
    async fn creates_directory_and_appends_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("reports").join("logs");
        let sink = FileSink::new(&dir);

        let first = LogRecord::new(Level::Info, "LoginPage", "first", vec![]);
        let second = LogRecord::new(Level::Debug, "LoginPage", "second", vec![]);
        sink.send(&first).await.unwrap();
        sink.send(&second).await.unwrap();

        let content = std::fs::read_to_string(sink.file_for(first.timestamp.date_naive())).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(ParsedLine::parse(lines[0]).unwrap().message, "first");
        assert_eq!(ParsedLine::parse(lines[1]).unwrap().level, Level::Debug);
    }

    #[test]
    fn file_name_uses_the_calendar_day() {
        let sink = FileSink::new("reports/logs");
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            sink.file_for(day),
            PathBuf::from("reports/logs/test-execution-2024-03-09.log")
        );
    }
}
