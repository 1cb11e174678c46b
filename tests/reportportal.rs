//! ReportPortal launch lifecycle and log shipping against a local backend.

#![cfg(feature = "reportportal")]

use e2e_log_sink::config::ReportPortalSettings;
use e2e_log_sink::dispatch::SINK_FAILURE_CONTEXT;
use e2e_log_sink::memory_sink::MemorySink;
use e2e_log_sink::reportportal::ReportPortalSink;
use e2e_log_sink::{Level, LogRecord, LogSink, Logger, LoggerConfig};
use std::net::SocketAddr;
use std::sync::Arc;

mod common;

fn settings(addr: SocketAddr) -> ReportPortalSettings {
    ReportPortalSettings {
        enabled: true,
        endpoint: format!("http://{}", addr),
        project: "bank".to_string(),
        token: "secret-token".to_string(),
        launch: "nightly".to_string(),
    }
}

fn body_of(request: &str) -> serde_json::Value {
    let (_, body) = request.split_once("\r\n\r\n").unwrap();
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn launch_is_started_with_bearer_auth() {
    let (addr, seen) = common::start_recording_backend(201, r#"{"id":"launch-42"}"#).await;

    let sink = ReportPortalSink::start_launch(settings(addr)).await.unwrap();

    assert_eq!(sink.launch_uuid(), "launch-42");
    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("POST /api/v1/bank/launch HTTP/1.1"));
    assert!(requests[0]
        .to_ascii_lowercase()
        .contains("authorization: bearer secret-token"));
    let body = body_of(&requests[0]);
    assert_eq!(body["name"], "nightly");
    assert_eq!(body["mode"], "DEFAULT");
}

#[tokio::test]
async fn records_are_posted_as_launch_logs() {
    let (addr, seen) = common::start_recording_backend(200, r#"{"id":"ok"}"#).await;
    let sink = ReportPortalSink::new(settings(addr), "launch-42");

    let record = LogRecord::new(Level::Error, "LoansPage", "quote rejected", vec![])
        .with_detail("caused by: timeout");
    sink.send(&record).await.unwrap();

    let requests = seen.lock().unwrap().clone();
    assert!(requests[0].starts_with("POST /api/v2/bank/log HTTP/1.1"));
    assert!(requests[0]
        .to_ascii_lowercase()
        .contains("authorization: bearer secret-token"));
    let body = body_of(&requests[0]);
    assert_eq!(body["launchUuid"], "launch-42");
    assert_eq!(body["level"], "error");
    assert_eq!(body["time"], record.timestamp_iso());
    assert_eq!(body["message"], "[LoansPage] quote rejected\ncaused by: timeout");
}

#[tokio::test]
async fn finishing_puts_to_the_launch() {
    let (addr, seen) = common::start_recording_backend(200, "{}").await;
    let sink = ReportPortalSink::new(settings(addr), "launch-42");

    sink.finish_launch().await.unwrap();

    let requests = seen.lock().unwrap().clone();
    assert!(requests[0].starts_with("PUT /api/v1/bank/launch/launch-42/finish HTTP/1.1"));
    assert!(body_of(&requests[0])["endTime"].is_string());
}

#[tokio::test]
async fn rejected_launch_is_an_error() {
    let (addr, _seen) = common::start_recording_backend(401, r#"{"message":"bad token"}"#).await;

    let err = ReportPortalSink::start_launch(settings(addr)).await.err().unwrap();

    let message = err.to_string();
    assert!(message.contains("401"));
    assert!(message.contains("bad token"));
}

#[tokio::test]
async fn server_errors_are_reported_to_the_other_sinks() {
    let (addr, _seen) = common::start_recording_backend(500, r#"{"message":"down"}"#).await;
    let memory = MemorySink::new();
    let config = LoggerConfig::new(Level::Info)
        .with_sink(Arc::new(ReportPortalSink::new(settings(addr), "launch-42")))
        .with_sink(Arc::new(memory.clone()));
    let logger = Logger::new("LoginTest", config);

    logger.info("login page opened");
    logger.flush().await;

    let records = memory.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].message, "login page opened");
    assert_eq!(records[1].level, Level::Warn);
    assert_eq!(records[1].context, SINK_FAILURE_CONTEXT);
    assert!(records[1].message.contains("reportportal"));
    assert!(records[1].message.contains("500"));
    assert_eq!(logger.stats().sink_failures, 1);
}
