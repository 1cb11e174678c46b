//! Shared stubs for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use e2e_log_sink::driver::{ActionKind, PageDriver, ReadKind, Readiness};
use e2e_log_sink::http::{HttpResponse, HttpTransport, Method, RequestOptions};
use e2e_log_sink::memory_sink::MemorySink;
use e2e_log_sink::{Level, Logger, LoggerConfig};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Logger writing into a fresh [`MemorySink`].
pub fn memory_logger(context: &str, min_level: Level) -> (Logger, MemorySink) {
    let memory = MemorySink::new();
    let config = LoggerConfig::new(min_level).with_sink(Arc::new(memory.clone()));
    (Logger::new(context, config), memory)
}

/// Transport returning a canned result and recording every call.
#[derive(Clone, Default)]
pub struct StubTransport {
    pub calls: Arc<Mutex<Vec<(Method, String, RequestOptions)>>>,
    response: Option<HttpResponse>,
    error: Option<std::io::ErrorKind>,
}

impl StubTransport {
    pub fn returning(status: u16, body: &str) -> Self {
        Self {
            response: Some(HttpResponse::new(status, body)),
            ..Self::default()
        }
    }

    pub fn failing(kind: std::io::ErrorKind) -> Self {
        Self {
            error: Some(kind),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    type Error = std::io::Error;

    async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, Self::Error> {
        self.calls
            .lock()
            .unwrap()
            .push((method, url.to_string(), options));
        if let Some(kind) = self.error {
            return Err(std::io::Error::new(kind, "stub transport failure"));
        }
        let mut response = self.response.clone().expect("stub has a response");
        response.url = url.to_string();
        Ok(response)
    }
}

/// How a [`StubDriver`] answers readiness waits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitBehavior {
    Ready,
    /// Sleeps for the full timeout, then reports not ready.
    NeverReady,
    /// Never returns.
    Hang,
    Fail,
}

#[derive(Debug, thiserror::Error)]
#[error("driver error: {0}")]
pub struct DriverError(pub String);

/// Page driver that records the sequence of calls it receives.
pub struct StubDriver {
    pub wait: WaitBehavior,
    pub events: Mutex<Vec<String>>,
    pub texts: HashMap<String, String>,
}

impl StubDriver {
    pub fn new(wait: WaitBehavior) -> Self {
        Self {
            wait,
            events: Mutex::new(Vec::new()),
            texts: HashMap::new(),
        }
    }

    pub fn with_text(mut self, selector: &str, text: &str) -> Self {
        self.texts.insert(selector.to_string(), text.to_string());
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl PageDriver for StubDriver {
    type Target = String;
    type Error = DriverError;

    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), Self::Error> {
        self.push(format!("navigate {}", url));
        Ok(())
    }

    fn locate(&self, selector: &str) -> Self::Target {
        selector.to_string()
    }

    fn describe(&self, target: &Self::Target) -> String {
        format!("Locator[{}]", target)
    }

    async fn wait(
        &self,
        target: &Self::Target,
        state: Readiness,
        timeout: Duration,
    ) -> Result<bool, Self::Error> {
        self.push(format!("wait {} {}", target, state));
        match self.wait {
            WaitBehavior::Ready => Ok(true),
            WaitBehavior::NeverReady => {
                tokio::time::sleep(timeout).await;
                Ok(false)
            }
            WaitBehavior::Hang => {
                std::future::pending::<()>().await;
                Ok(false)
            }
            WaitBehavior::Fail => Err(DriverError("page crashed".to_string())),
        }
    }

    async fn perform(
        &self,
        target: &Self::Target,
        action: ActionKind,
        value: Option<&str>,
    ) -> Result<(), Self::Error> {
        match value {
            Some(v) => self.push(format!("perform {:?} {} {}", action, target, v)),
            None => self.push(format!("perform {:?} {}", action, target)),
        }
        Ok(())
    }

    async fn read(&self, target: &Self::Target, what: ReadKind) -> Result<Option<String>, Self::Error> {
        self.push(format!("read {:?} {}", what, target));
        Ok(self.texts.get(target).cloned())
    }
}

/// Start a raw HTTP backend answering every request with `status` and
/// `body`. Returns the bound address.
pub async fn start_mock_backend(status: u16, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let reason = match status {
                    200 => "OK",
                    201 => "Created",
                    404 => "Not Found",
                    500 => "Internal Server Error",
                    _ => "OK",
                };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Requests seen by a recording backend, as raw HTTP text.
pub type SeenRequests = Arc<Mutex<Vec<String>>>;

/// Like [`start_mock_backend`], but keeps every full request (head and
/// body) it receives.
pub async fn start_recording_backend(status: u16, body: &'static str) -> (SocketAddr, SeenRequests) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen: SeenRequests = Arc::new(Mutex::new(Vec::new()));
    let seen_bg = Arc::clone(&seen);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let seen = Arc::clone(&seen_bg);
            tokio::spawn(async move {
                let request = read_request(&mut socket).await;
                seen.lock().unwrap().push(request);

                let response = format!(
                    "HTTP/1.1 {} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, seen)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}
