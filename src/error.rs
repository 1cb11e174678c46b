//! Failure conditions introduced by the tracing and verification helpers.
//!
//! Transport and driver errors are never converted into these types; they
//! are carried unchanged (see [`ActionError::Driver`] and
//! [`ApiError::Transport`]).

use crate::driver::{ActionKind, Readiness};
use std::error::Error;
use std::time::Duration;
use thiserror::Error;

/// A verification helper observed something other than what it expected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("status mismatch: expected {expected}, got {actual}. Response: {body}")]
    StatusMismatch {
        expected: u16,
        actual: u16,
        body: String,
    },

    #[error("content mismatch: expected {expected:?}, actual {actual:?}")]
    ContentMismatch { expected: String, actual: String },
}

/// A UI target never satisfied its readiness predicate in time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("target not ready: {} was not {state} within {timeout:?}", describe(.action, .target))]
pub struct TargetNotReady {
    /// The action that was waiting, or `None` for a plain wait.
    pub action: Option<ActionKind>,
    pub target: String,
    pub state: Readiness,
    pub timeout: Duration,
}

fn describe(action: &Option<ActionKind>, target: &str) -> String {
    match action {
        Some(action) => format!("{} on {}", action, target),
        None => target.to_string(),
    }
}

/// Outcome of a wrapped UI action.
#[derive(Error, Debug)]
pub enum ActionError<E>
where
    E: Error + 'static,
{
    #[error(transparent)]
    NotReady(#[from] TargetNotReady),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    /// The page driver failed; the error is passed through untouched.
    #[error(transparent)]
    Driver(E),
}

impl<E: Error + 'static> ActionError<E> {
    /// The driver's own error, if that is what failed.
    pub fn into_driver_error(self) -> Option<E> {
        match self {
            ActionError::Driver(e) => Some(e),
            _ => None,
        }
    }
}

/// Outcome of a typed API call made through [`ApiClient`](crate::api::ApiClient).
#[derive(Error, Debug)]
pub enum ApiError<E>
where
    E: Error + 'static,
{
    /// The HTTP transport failed; the error is passed through untouched.
    #[error(transparent)]
    Transport(E),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A log sink could not complete a write. Recovered inside the
/// dispatcher and never returned to callers.
#[derive(Error, Debug)]
#[error("sink '{sink}' failed: {source}")]
pub struct SinkFailure {
    pub sink: String,
    #[source]
    pub source: Box<dyn Error + Send + Sync>,
}
