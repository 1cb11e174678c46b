use crate::config::ReportPortalSettings;
use crate::record::{Level, LogRecord};
use crate::sink::LogSink;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;

/// ReportPortal implementation of [`LogSink`] using its REST API.
///
/// Records are attached to a launch as launch-level log entries. The
/// launch is created by [`ReportPortalSink::start_launch`] and should be
/// closed with [`ReportPortalSink::finish_launch`] once the run ends.
#[derive(Clone)]
pub struct ReportPortalSink {
    client: Client,
    settings: ReportPortalSettings,
    launch_uuid: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartLaunch<'a> {
    name: &'a str,
    start_time: String,
    mode: &'static str,
}

#[derive(Deserialize)]
struct LaunchCreated {
    id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FinishLaunch {
    end_time: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogEntry {
    launch_uuid: String,
    time: String,
    message: String,
    level: &'static str,
}

impl ReportPortalSink {
    /// Attach to an already running launch.
    pub fn new(settings: ReportPortalSettings, launch_uuid: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            settings,
            launch_uuid: launch_uuid.into(),
        }
    }

    /// Create a launch named `settings.launch` and return a sink writing to it.
    ///
    /// **Returns**
    /// - `Err(..)` if ReportPortal is unreachable or rejects the request.
    pub async fn start_launch(settings: ReportPortalSettings) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let client = Client::new();
        let body = StartLaunch {
            name: &settings.launch,
            start_time: now(),
            mode: "DEFAULT",
        };

        let resp = client
            .post(endpoint(&settings, "v1", "launch"))
            .bearer_auth(&settings.token)
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            return Err(format!("ReportPortal launch start failed with status {}: {}", status, text).into());
        }
        let created: LaunchCreated = resp.json().await?;

        Ok(Self {
            client,
            settings,
            launch_uuid: created.id,
        })
    }

    pub fn launch_uuid(&self) -> &str {
        &self.launch_uuid
    }

    /// Close the launch. Further records are rejected by ReportPortal.
    pub async fn finish_launch(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let path = format!("launch/{}/finish", urlencoding::encode(&self.launch_uuid));
        let resp = self
            .client
            .put(endpoint(&self.settings, "v1", &path))
            .bearer_auth(&self.settings.token)
            .json(&FinishLaunch { end_time: now() })
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            Err(format!("ReportPortal launch finish failed with status {}: {}", status, text).into())
        }
    }

    fn map_record(&self, record: &LogRecord) -> LogEntry {
        let message = match &record.detail {
            Some(detail) => format!("[{}] {}\n{}", record.context, record.body(), detail),
            None => format!("[{}] {}", record.context, record.body()),
        };
        LogEntry {
            launch_uuid: self.launch_uuid.clone(),
            time: record.timestamp_iso(),
            message,
            level: rp_level(record.level),
        }
    }
}

fn rp_level(level: Level) -> &'static str {
    match level {
        Level::Debug => "debug",
        Level::Info => "info",
        Level::Warn => "warn",
        Level::Error => "error",
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn endpoint(settings: &ReportPortalSettings, version: &str, path: &str) -> String {
    format!(
        "{}/api/{}/{}/{}",
        settings.endpoint.trim_end_matches('/'),
        version,
        urlencoding::encode(&settings.project),
        path
    )
}

#[async_trait]
impl LogSink for ReportPortalSink {
    fn name(&self) -> &str {
        "reportportal"
    }

    async fn send(&self, record: &LogRecord) -> Result<(), Box<dyn Error + Send + Sync>> {
        let entry = self.map_record(record);
        let resp = self
            .client
            .post(endpoint(&self.settings, "v2", "log"))
            .bearer_auth(&self.settings.token)
            .json(&entry)
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            Err(format!("ReportPortal log insert failed with status {}: {}", status, text).into())
        }
    }
}
