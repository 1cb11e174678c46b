use crate::http::{HttpResponse, HttpTransport, Method, RequestOptions};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// [`HttpTransport`] backed by a `reqwest` client.
///
/// Bodies are buffered in full. A per-request timeout from
/// [`RequestOptions`] wins over the transport default.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
    default_timeout: Option<Duration>,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            default_timeout: None,
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    type Error = reqwest::Error;

    async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, Self::Error> {
        let mut builder = self.client.request(Self::method(method), url);
        if !options.params.is_empty() {
            builder = builder.query(&options.params);
        }
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(data) = &options.data {
            builder = builder.json(data);
        }
        if let Some(timeout) = options.timeout.or(self.default_timeout) {
            builder = builder.timeout(timeout);
        }

        let started = Instant::now();
        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let headers = resp
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect::<BTreeMap<_, _>>();
        let body = resp.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            url: final_url,
            headers,
            body,
            elapsed: Some(started.elapsed()),
        })
    }
}
