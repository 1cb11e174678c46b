use crate::config::SuiteConfig;
use crate::error::ApiError;
use crate::http::{HttpResponse, HttpTransport, Method, RequestOptions, TracingHttpClient};
use crate::logger::Logger;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub type ApiResult<T, H> = Result<T, ApiError<<H as HttpTransport>::Error>>;

/// Base for typed REST clients: resolves endpoints against a base URL,
/// applies default headers and timeout, and traces every call through a
/// [`TracingHttpClient`].
pub struct ApiClient<T> {
    http: TracingHttpClient<T>,
    base_url: String,
    default_headers: BTreeMap<String, String>,
    timeout: Duration,
    responses_dir: PathBuf,
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn new(transport: T, logger: Logger, base_url: impl Into<String>) -> Self {
        Self::from_config(transport, logger, &SuiteConfig {
            api_base_url: base_url.into(),
            ..SuiteConfig::default()
        })
    }

    /// Client for `cfg.api_base_url` using the configured timeout, body
    /// log limit and responses directory.
    pub fn from_config(transport: T, logger: Logger, cfg: &SuiteConfig) -> Self {
        let mut default_headers = BTreeMap::new();
        default_headers.insert("Content-Type".to_string(), "application/json".to_string());
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        default_headers.insert(
            "User-Agent".to_string(),
            concat!("e2e-log-sink/", env!("CARGO_PKG_VERSION")).to_string(),
        );

        Self {
            http: TracingHttpClient::new(transport, logger).with_body_log_limit(cfg.body_log_limit),
            base_url: cfg.api_base_url.trim_end_matches('/').to_string(),
            default_headers,
            timeout: cfg.api_timeout,
            responses_dir: cfg.responses_dir.clone(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_responses_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.responses_dir = dir.into();
        self
    }

    pub fn http(&self) -> &TracingHttpClient<T> {
        &self.http
    }

    pub fn logger(&self) -> &Logger {
        self.http.logger()
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Send `options` to `endpoint`, filling in default headers and the
    /// default timeout where the caller did not set them.
    pub async fn send(&self, method: Method, endpoint: &str, mut options: RequestOptions) -> ApiResult<HttpResponse, T> {
        for (name, value) in &self.default_headers {
            options
                .headers
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
        options.timeout.get_or_insert(self.timeout);

        self.http
            .request(method, &self.url(endpoint), options)
            .await
            .map_err(ApiError::Transport)
    }

    pub async fn get(&self, endpoint: &str) -> ApiResult<HttpResponse, T> {
        self.send(Method::Get, endpoint, RequestOptions::new()).await
    }

    pub async fn get_with_params(&self, endpoint: &str, params: &[(&str, String)]) -> ApiResult<HttpResponse, T> {
        let options = params
            .iter()
            .fold(RequestOptions::new(), |opts, (k, v)| opts.param(*k, v));
        self.send(Method::Get, endpoint, options).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> ApiResult<HttpResponse, T> {
        let options = RequestOptions::new().json(serde_json::to_value(body)?);
        self.send(Method::Post, endpoint, options).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> ApiResult<HttpResponse, T> {
        let options = RequestOptions::new().json(serde_json::to_value(body)?);
        self.send(Method::Put, endpoint, options).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> ApiResult<HttpResponse, T> {
        let options = RequestOptions::new().json(serde_json::to_value(body)?);
        self.send(Method::Patch, endpoint, options).await
    }

    pub async fn delete(&self, endpoint: &str) -> ApiResult<HttpResponse, T> {
        self.send(Method::Delete, endpoint, RequestOptions::new()).await
    }

    pub fn verify_status_code(&self, response: &HttpResponse, expected: u16) -> ApiResult<(), T> {
        Ok(self.http.verify_status_code(response, expected)?)
    }

    pub fn verify_response_contains(&self, response: &HttpResponse, expected: &str) -> ApiResult<(), T> {
        Ok(self.http.verify_response_contains(response, expected)?)
    }

    /// Verify the status, then decode the body.
    pub fn expect_json<R: DeserializeOwned>(&self, response: &HttpResponse, expected_status: u16) -> ApiResult<R, T> {
        self.verify_status_code(response, expected_status)?;
        Ok(response.json()?)
    }

    /// The body as JSON when it parses, otherwise as text.
    pub fn response_body(&self, response: &HttpResponse) -> Value {
        response.body_value()
    }

    /// Write the body as pretty JSON to `<responses_dir>/<name>-<unix millis>.json`.
    pub async fn save_response_to_file(&self, response: &HttpResponse, name: &str) -> ApiResult<PathBuf, T> {
        tokio::fs::create_dir_all(&self.responses_dir).await?;

        let path = self.responses_dir.join(format!(
            "{}-{}.json",
            name,
            chrono::Utc::now().timestamp_millis()
        ));
        let pretty = serde_json::to_string_pretty(&response.body_value())?;
        tokio::fs::write(&path, pretty).await?;

        self.logger()
            .info(format!("Response saved to: {}", path.display()));
        Ok(path)
    }
}
