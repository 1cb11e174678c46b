use crate::driver::{ActionKind, PageDriver, ReadKind, Readiness};
use crate::error::{ActionError, TargetNotReady, VerifyError};
use crate::logger::Logger;
use std::time::Duration;

/// Description of one UI interaction, used for logging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTrace {
    pub kind: ActionKind,
    pub target: String,
    pub value: Option<String>,
}

/// Wraps UI actions of a [`PageDriver`] with readiness waits and logging.
///
/// Each call waits for its target, delegates to the driver exactly once
/// and then logs the action. Nothing is cached between calls: two calls
/// mean two waits and two driver invocations.
pub struct ActionRecorder<'d, D: PageDriver> {
    driver: &'d D,
    logger: Logger,
    timeout: Duration,
    page_load_timeout: Duration,
}

type ActionResult<T, D> = Result<T, ActionError<<D as PageDriver>::Error>>;

impl<'d, D: PageDriver> ActionRecorder<'d, D> {
    /// `timeout` bounds every readiness wait that does not pass its own.
    pub fn new(driver: &'d D, logger: Logger, timeout: Duration) -> Self {
        Self {
            driver,
            logger,
            timeout,
            page_load_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_page_load_timeout(mut self, timeout: Duration) -> Self {
        self.page_load_timeout = timeout;
        self
    }

    pub fn driver(&self) -> &D {
        self.driver
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn locate(&self, selector: &str) -> D::Target {
        self.driver.locate(selector)
    }

    pub async fn navigate(&self, url: &str) -> ActionResult<(), D> {
        self.logger.info(format!("Navigating to: {}", url));
        self.driver
            .navigate(url, self.page_load_timeout)
            .await
            .map_err(ActionError::Driver)
    }

    /// Wait for `target` to satisfy `state`, e.g. a spinner becoming hidden.
    pub async fn wait_for(&self, target: &D::Target, state: Readiness, timeout: Duration) -> ActionResult<(), D> {
        self.await_ready(target, None, state, timeout).await
    }

    // The driver is trusted to honor the timeout, but the wait is also cut
    // off here so a stalled driver still yields TargetNotReady.
    async fn await_ready(
        &self,
        target: &D::Target,
        action: Option<ActionKind>,
        state: Readiness,
        timeout: Duration,
    ) -> ActionResult<(), D> {
        let ready = match tokio::time::timeout(timeout, self.driver.wait(target, state, timeout)).await {
            Ok(result) => result.map_err(ActionError::Driver)?,
            Err(_elapsed) => false,
        };
        if ready {
            return Ok(());
        }

        let err = TargetNotReady {
            action,
            target: self.driver.describe(target),
            state,
            timeout,
        };
        self.logger.error(err.to_string());
        Err(err.into())
    }

    /// Wait for the action's readiness predicate, delegate once, then log.
    pub async fn perform(
        &self,
        target: &D::Target,
        kind: ActionKind,
        value: Option<&str>,
        timeout: Option<Duration>,
    ) -> ActionResult<(), D> {
        let trace = ActionTrace {
            kind,
            target: self.driver.describe(target),
            value: value.map(str::to_string),
        };
        self.logger.debug(format!("{} requested on {}", trace.kind, trace.target));

        self.await_ready(target, Some(kind), kind.readiness(), timeout.unwrap_or(self.timeout))
            .await?;
        self.driver
            .perform(target, kind, value)
            .await
            .map_err(ActionError::Driver)?;

        self.logger
            .ui_action(trace.kind, Some(trace.target.as_str()), trace.value.as_deref());
        Ok(())
    }

    pub async fn click(&self, target: &D::Target) -> ActionResult<(), D> {
        self.perform(target, ActionKind::Click, None, None).await
    }

    pub async fn double_click(&self, target: &D::Target) -> ActionResult<(), D> {
        self.perform(target, ActionKind::DoubleClick, None, None).await
    }

    pub async fn fill(&self, target: &D::Target, text: &str) -> ActionResult<(), D> {
        self.perform(target, ActionKind::Fill, Some(text), None).await
    }

    pub async fn clear_and_fill(&self, target: &D::Target, text: &str) -> ActionResult<(), D> {
        self.perform(target, ActionKind::Clear, None, None).await?;
        self.fill(target, text).await
    }

    pub async fn select_option(&self, target: &D::Target, value: &str) -> ActionResult<(), D> {
        self.perform(target, ActionKind::Select, Some(value), None).await
    }

    pub async fn check(&self, target: &D::Target) -> ActionResult<(), D> {
        self.perform(target, ActionKind::Check, None, None).await
    }

    pub async fn uncheck(&self, target: &D::Target) -> ActionResult<(), D> {
        self.perform(target, ActionKind::Uncheck, None, None).await
    }

    pub async fn hover(&self, target: &D::Target) -> ActionResult<(), D> {
        self.perform(target, ActionKind::Hover, None, None).await
    }

    /// Trimmed text content; empty when the target has none.
    pub async fn text(&self, target: &D::Target) -> ActionResult<String, D> {
        self.read(target, ReadKind::Text).await
    }

    pub async fn attribute(&self, target: &D::Target, name: &str) -> ActionResult<String, D> {
        self.read(target, ReadKind::Attribute(name.to_string())).await
    }

    pub async fn input_value(&self, target: &D::Target) -> ActionResult<String, D> {
        self.read(target, ReadKind::InputValue).await
    }

    async fn read(&self, target: &D::Target, what: ReadKind) -> ActionResult<String, D> {
        let value = self
            .driver
            .read(target, what)
            .await
            .map_err(ActionError::Driver)?;
        Ok(value.map(|v| v.trim().to_string()).unwrap_or_default())
    }

    /// Fail with [`VerifyError::ContentMismatch`] unless the text equals `expected`.
    pub async fn verify_text(&self, target: &D::Target, expected: &str) -> ActionResult<(), D> {
        let actual = self.text(target).await?;
        self.logger.verification(
            format!("Text of {}", self.driver.describe(target)),
            expected,
            &actual,
        );
        if actual != expected {
            return Err(mismatch(expected, actual).into());
        }
        Ok(())
    }

    /// Fail with [`VerifyError::ContentMismatch`] unless the text contains `expected`.
    pub async fn verify_contains_text(&self, target: &D::Target, expected: &str) -> ActionResult<(), D> {
        let actual = self.text(target).await?;
        self.logger.verification(
            format!("Text of {} contains", self.driver.describe(target)),
            expected,
            &actual,
        );
        if !actual.contains(expected) {
            return Err(mismatch(expected, actual).into());
        }
        Ok(())
    }
}

fn mismatch(expected: &str, actual: String) -> VerifyError {
    VerifyError::ContentMismatch {
        expected: expected.to_string(),
        actual,
    }
}
