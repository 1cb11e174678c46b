//! Capabilities the tracing layer consumes from a browser-automation
//! backend. Nothing here controls a browser; implementations wrap one.

use async_trait::async_trait;
use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Condition a UI target must satisfy before an action may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    Visible,
    Hidden,
    Attached,
    /// Attached to the DOM and enabled for input.
    Enabled,
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Readiness::Visible => "visible",
            Readiness::Hidden => "hidden",
            Readiness::Attached => "attached",
            Readiness::Enabled => "enabled",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Click,
    DoubleClick,
    Fill,
    Clear,
    Select,
    Check,
    Uncheck,
    Hover,
}

impl ActionKind {
    /// Readiness predicate awaited before performing this action.
    pub fn readiness(&self) -> Readiness {
        match self {
            ActionKind::Hover => Readiness::Visible,
            _ => Readiness::Enabled,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Click => "Click",
            ActionKind::DoubleClick => "Double click",
            ActionKind::Fill => "Type",
            ActionKind::Clear => "Clear",
            ActionKind::Select => "Select option",
            ActionKind::Check => "Check",
            ActionKind::Uncheck => "Uncheck",
            ActionKind::Hover => "Hover",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What to read from a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadKind {
    Text,
    Attribute(String),
    InputValue,
}

/// Browser-automation backend driving one page.
///
/// One driver belongs to one test execution; the wrappers in this crate
/// never share it across executions.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Handle to a located element.
    type Target: Send + Sync;
    type Error: Error + Send + Sync + 'static;

    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), Self::Error>;

    fn locate(&self, selector: &str) -> Self::Target;

    /// Human-readable description of `target` used in log lines and errors.
    fn describe(&self, target: &Self::Target) -> String;

    /// Wait until `target` satisfies `state`.
    ///
    /// **Returns**
    /// - `Ok(true)` once the predicate holds.
    /// - `Ok(false)` if `timeout` elapsed first.
    async fn wait(
        &self,
        target: &Self::Target,
        state: Readiness,
        timeout: Duration,
    ) -> Result<bool, Self::Error>;

    async fn perform(
        &self,
        target: &Self::Target,
        action: ActionKind,
        value: Option<&str>,
    ) -> Result<(), Self::Error>;

    async fn read(&self, target: &Self::Target, what: ReadKind) -> Result<Option<String>, Self::Error>;
}
