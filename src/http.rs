use crate::error::VerifyError;
use crate::logger::Logger;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Default number of body characters logged for successful responses.
pub const DEFAULT_BODY_LOG_LIMIT: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call options handed to an [`HttpTransport`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Query parameters, appended in order.
    pub params: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    /// JSON request body.
    pub data: Option<Value>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn json(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// What gets narrated as the request payload: the body if any,
    /// otherwise the query parameters.
    fn logged_payload(&self) -> Option<Value> {
        if let Some(data) = &self.data {
            return Some(data.clone());
        }
        if self.params.is_empty() {
            return None;
        }
        let params = self
            .params
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<serde_json::Map<_, _>>();
        Some(Value::Object(params))
    }
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
    /// Time from dispatch to the full body, when the transport measured it.
    pub elapsed: Option<Duration>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            url: String::new(),
            headers: BTreeMap::new(),
            body: body.into(),
            elapsed: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// The body as JSON when it parses, otherwise as a JSON string.
    pub fn body_value(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|_| Value::String(self.text().into_owned()))
    }
}

/// HTTP capability consumed by the tracing layer.
///
/// Implementations must perform exactly one request per call and apply
/// `options.timeout` so a call never hangs indefinitely.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    type Error: Error + Send + Sync + 'static;

    async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, Self::Error>;

    async fn get(&self, url: &str, options: RequestOptions) -> Result<HttpResponse, Self::Error> {
        self.request(Method::Get, url, options).await
    }

    async fn post(&self, url: &str, options: RequestOptions) -> Result<HttpResponse, Self::Error> {
        self.request(Method::Post, url, options).await
    }

    async fn put(&self, url: &str, options: RequestOptions) -> Result<HttpResponse, Self::Error> {
        self.request(Method::Put, url, options).await
    }

    async fn patch(&self, url: &str, options: RequestOptions) -> Result<HttpResponse, Self::Error> {
        self.request(Method::Patch, url, options).await
    }

    async fn delete(&self, url: &str, options: RequestOptions) -> Result<HttpResponse, Self::Error> {
        self.request(Method::Delete, url, options).await
    }
}

/// Description of one HTTP call, used for logging only.
///
/// Created when the request is dispatched and completed once the response
/// arrives; the call that built it owns it and drops it after logging.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestTrace {
    pub method: Method,
    pub url: String,
    pub request_body: Option<Value>,
    pub status: Option<u16>,
    /// Set only when the body is within the log limit or the call failed.
    pub response_body: Option<Value>,
}

impl RequestTrace {
    fn start(method: Method, url: &str, options: &RequestOptions) -> Self {
        Self {
            method,
            url: url.to_string(),
            request_body: options.logged_payload(),
            status: None,
            response_body: None,
        }
    }
}

/// Decorator that narrates every call of an inner [`HttpTransport`].
///
/// The request is logged before dispatch and the status (plus body, within
/// limits) after it resolves. Responses and errors from the inner
/// transport are returned as-is, and each call reaches the inner
/// transport exactly once.
pub struct TracingHttpClient<T> {
    inner: T,
    logger: Logger,
    body_log_limit: usize,
}

impl<T: HttpTransport> TracingHttpClient<T> {
    pub fn new(inner: T, logger: Logger) -> Self {
        Self {
            inner,
            logger,
            body_log_limit: DEFAULT_BODY_LOG_LIMIT,
        }
    }

    /// Successful bodies longer than `limit` characters are not logged.
    /// Error bodies are always logged.
    pub fn with_body_log_limit(mut self, limit: usize) -> Self {
        self.body_log_limit = limit;
        self
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Fill in the response half of `trace` and log it.
    fn complete(&self, trace: &mut RequestTrace, response: &HttpResponse) {
        trace.status = Some(response.status);
        let chars = response.text().chars().count();
        let skipped = response.status < 400 && chars > self.body_log_limit;
        if chars > 0 && !skipped {
            trace.response_body = Some(response.body_value());
        }

        self.logger
            .api_response(response.status, trace.response_body.as_ref());
        if skipped {
            self.logger
                .debug(format!("Response body of {} characters not logged", chars));
        }
    }

    /// Fail with [`VerifyError::StatusMismatch`] unless `response` has `expected` status.
    pub fn verify_status_code(&self, response: &HttpResponse, expected: u16) -> Result<(), VerifyError> {
        self.logger
            .verification("Status code", expected, response.status);
        if response.status != expected {
            let err = VerifyError::StatusMismatch {
                expected,
                actual: response.status,
                body: response.text().into_owned(),
            };
            self.logger.error(err.to_string());
            return Err(err);
        }
        self.logger.info(format!("✓ Status code verified: {}", expected));
        Ok(())
    }

    /// Fail with [`VerifyError::ContentMismatch`] unless the body contains `expected`.
    pub fn verify_response_contains(&self, response: &HttpResponse, expected: &str) -> Result<(), VerifyError> {
        let body = response.text();
        if !body.contains(expected) {
            let err = VerifyError::ContentMismatch {
                expected: expected.to_string(),
                actual: body.into_owned(),
            };
            self.logger.error(err.to_string());
            return Err(err);
        }
        self.logger.info(format!("✓ Response contains: \"{}\"", expected));
        Ok(())
    }

    /// Warn when the transport-measured latency exceeds `max`. Never fails.
    pub fn verify_response_time(&self, response: &HttpResponse, max: Duration) {
        if let Some(elapsed) = response.elapsed {
            if elapsed > max {
                self.logger.warn(format!(
                    "Response time {}ms exceeds maximum {}ms",
                    elapsed.as_millis(),
                    max.as_millis()
                ));
            }
        }
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for TracingHttpClient<T> {
    type Error = T::Error;

    async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, Self::Error> {
        let mut trace = RequestTrace::start(method, url, &options);
        self.logger
            .api_request(trace.method, &trace.url, trace.request_body.as_ref());

        match self.inner.request(method, url, options).await {
            Ok(response) => {
                self.complete(&mut trace, &response);
                Ok(response)
            }
            Err(e) => {
                self.logger.error_cause(
                    format!("✗ {} {} failed", trace.method, trace.url),
                    &e,
                    Vec::new(),
                );
                Err(e)
            }
        }
    }
}
