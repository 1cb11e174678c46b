use crate::action::ActionRecorder;
use crate::api::ApiClient;
use crate::config::SuiteConfig;
use crate::driver::PageDriver;
use crate::http::{HttpTransport, TracingHttpClient};
use crate::logger::{Logger, LoggerConfig};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

/// Resources owned by one test execution.
///
/// Everything built from a context logs through the context's
/// [`Logger`] family, so a test and its page objects and API clients
/// share one ordered record stream. Clones refer to the same execution;
/// nothing is shared between separately begun contexts.
#[derive(Clone)]
pub struct TestContext {
    title: String,
    logger: Logger,
    suite: SuiteConfig,
}

impl TestContext {
    /// Start a test execution. Must be called from within a Tokio runtime.
    pub fn begin(title: impl Into<String>, config: LoggerConfig, suite: SuiteConfig) -> Self {
        let title = title.into();
        let logger = Logger::new(title.clone(), config);
        logger.info(format!("▶ Test started: {}", title));
        Self { title, logger, suite }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn suite(&self) -> &SuiteConfig {
        &self.suite
    }

    /// Tracing wrapper around `transport`, logging under `context`.
    pub fn http<T: HttpTransport>(&self, context: &str, transport: T) -> TracingHttpClient<T> {
        TracingHttpClient::new(transport, self.logger.child(context))
            .with_body_log_limit(self.suite.body_log_limit)
    }

    /// API client for the configured base URL, logging under `context`.
    pub fn api<T: HttpTransport>(&self, context: &str, transport: T) -> ApiClient<T> {
        ApiClient::from_config(transport, self.logger.child(context), &self.suite)
    }

    /// Action recorder for `driver`, logging under `context`.
    pub fn recorder<'d, D: PageDriver>(&self, context: &str, driver: &'d D) -> ActionRecorder<'d, D> {
        ActionRecorder::new(driver, self.logger.child(context), self.suite.action_timeout)
            .with_page_load_timeout(self.suite.page_load_timeout)
    }

    /// End the execution and flush every sink.
    pub async fn finish(self) {
        self.logger.info(format!("■ Test finished: {}", self.title));
        self.logger.flush().await;
    }
}

/// Run `body` inside a fresh [`TestContext`] and always flush the logs
/// afterwards, whether the body returns `Ok`, returns `Err` or panics.
///
/// A failing body is logged at ERROR before the result is handed back; a
/// panic is logged, the sinks are flushed, and the panic is resumed.
pub async fn run_test<F, Fut, R, E>(
    title: impl Into<String>,
    config: LoggerConfig,
    suite: SuiteConfig,
    body: F,
) -> Result<R, E>
where
    F: FnOnce(TestContext) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: std::error::Error + 'static,
{
    let ctx = TestContext::begin(title, config, suite);
    let outcome = AssertUnwindSafe(body(ctx.clone())).catch_unwind().await;

    match outcome {
        Ok(result) => {
            if let Err(e) = &result {
                ctx.logger.error_cause("✗ Test failed", e, Vec::new());
            }
            ctx.finish().await;
            result
        }
        Err(payload) => {
            ctx.logger
                .error(format!("✗ Test failed: panicked: {}", panic_message(&*payload)));
            ctx.finish().await;
            panic::resume_unwind(payload)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
