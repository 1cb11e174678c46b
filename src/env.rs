//! Environment variable names read by [`SuiteConfig::from_env`](crate::config::SuiteConfig::from_env).
//!
//! These are purely helpers; loggers, sinks and wrappers take explicit
//! configuration values and never touch the environment.

/// Base URL of the web application under test.
pub const BASE_URL_WEB_ENV: &str = "BASE_URL_WEB";

/// Base URL of the REST API under test.
pub const BASE_URL_API_ENV: &str = "BASE_URL_API";

/// Minimum log level: DEBUG, INFO, WARN or ERROR.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Directory holding the per-day log files.
pub const LOG_DIR_ENV: &str = "LOG_DIR";

/// Comma-separated sink names, e.g. `console,file`.
pub const LOG_SINKS_ENV: &str = "LOG_SINKS";

/// Largest successful response body, in characters, that is logged.
pub const LOG_BODY_LIMIT_ENV: &str = "LOG_BODY_LIMIT";

/// Directory for responses saved by API clients.
pub const RESPONSES_DIR_ENV: &str = "RESPONSES_DIR";

/// Timeouts in milliseconds.
pub const PAGE_LOAD_TIMEOUT_ENV: &str = "PAGE_LOAD_TIMEOUT";
pub const API_TIMEOUT_ENV: &str = "API_TIMEOUT";
pub const ACTION_TIMEOUT_ENV: &str = "ACTION_TIMEOUT";

/// ReportPortal settings; the sink is only built when enabled is `true`.
pub const REPORTPORTAL_ENABLED_ENV: &str = "REPORTPORTAL_ENABLED";
pub const REPORTPORTAL_ENDPOINT_ENV: &str = "REPORTPORTAL_ENDPOINT";
pub const REPORTPORTAL_PROJECT_ENV: &str = "REPORTPORTAL_PROJECT";
pub const REPORTPORTAL_TOKEN_ENV: &str = "REPORTPORTAL_TOKEN";
pub const REPORTPORTAL_LAUNCH_ENV: &str = "REPORTPORTAL_LAUNCH";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
