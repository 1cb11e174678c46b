use crate::env::*;
use crate::record::Level;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// ReportPortal connection settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportPortalSettings {
    pub enabled: bool,
    /// Base URL of the ReportPortal server, e.g. `http://localhost:8080`.
    pub endpoint: String,
    pub project: String,
    pub token: String,
    /// Name of the launch records are attached to.
    pub launch: String,
}

impl Default for ReportPortalSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "http://localhost:8080".to_string(),
            project: "default_personal".to_string(),
            token: String::new(),
            launch: "e2e-tests".to_string(),
        }
    }
}

/// Flat configuration for one test-suite run.
///
/// Built by the caller (explicitly, or via [`SuiteConfig::from_env`]) and
/// passed down; nothing in this crate reads it from global state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuiteConfig {
    pub web_base_url: String,
    pub api_base_url: String,
    pub log_level: Level,
    pub log_dir: PathBuf,
    /// Sink names, see [`crate::backend::SinkKind`].
    pub log_sinks: Vec<String>,
    /// Largest successful response body, in characters, that is logged.
    pub body_log_limit: usize,
    pub responses_dir: PathBuf,
    pub page_load_timeout: Duration,
    pub api_timeout: Duration,
    pub action_timeout: Duration,
    pub report_portal: ReportPortalSettings,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            web_base_url: "https://uibank.uipath.com".to_string(),
            api_base_url: "https://jsonplaceholder.typicode.com".to_string(),
            log_level: Level::Info,
            log_dir: PathBuf::from("reports/logs"),
            log_sinks: vec!["console".to_string(), "file".to_string()],
            body_log_limit: crate::http::DEFAULT_BODY_LOG_LIMIT,
            responses_dir: PathBuf::from("reports/api-responses"),
            page_load_timeout: Duration::from_millis(30_000),
            api_timeout: Duration::from_millis(10_000),
            action_timeout: Duration::from_millis(15_000),
            report_portal: ReportPortalSettings::default(),
        }
    }
}

impl SuiteConfig {
    /// Build a configuration from environment variables, falling back to
    /// [`SuiteConfig::default`] for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let ms = |key: &str, default: Duration| {
            Duration::from_millis(parsed(&lookup, key, default.as_millis() as u64))
        };

        Self {
            web_base_url: string(BASE_URL_WEB_ENV, &d.web_base_url),
            api_base_url: string(BASE_URL_API_ENV, &d.api_base_url),
            log_level: parsed(&lookup, LOG_LEVEL_ENV, d.log_level),
            log_dir: lookup(LOG_DIR_ENV).map(PathBuf::from).unwrap_or(d.log_dir),
            log_sinks: lookup(LOG_SINKS_ENV)
                .map(|v| split_list(&v))
                .unwrap_or(d.log_sinks),
            body_log_limit: parsed(&lookup, LOG_BODY_LIMIT_ENV, d.body_log_limit),
            responses_dir: lookup(RESPONSES_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or(d.responses_dir),
            page_load_timeout: ms(PAGE_LOAD_TIMEOUT_ENV, d.page_load_timeout),
            api_timeout: ms(API_TIMEOUT_ENV, d.api_timeout),
            action_timeout: ms(ACTION_TIMEOUT_ENV, d.action_timeout),
            report_portal: ReportPortalSettings {
                enabled: lookup(REPORTPORTAL_ENABLED_ENV).as_deref() == Some("true"),
                endpoint: string(REPORTPORTAL_ENDPOINT_ENV, &d.report_portal.endpoint),
                project: string(REPORTPORTAL_PROJECT_ENV, &d.report_portal.project),
                token: string(REPORTPORTAL_TOKEN_ENV, &d.report_portal.token),
                launch: string(REPORTPORTAL_LAUNCH_ENV, &d.report_portal.launch),
            },
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparsable configuration value");
            default
        }),
        None => default,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        assert_eq!(SuiteConfig::from_lookup(|_| None), SuiteConfig::default());
    }

    #[test]
    fn values_are_read_and_parsed() {
        let cfg = SuiteConfig::from_lookup(lookup(&[
            (LOG_LEVEL_ENV, "debug"),
            (LOG_SINKS_ENV, "console, memory,"),
            (API_TIMEOUT_ENV, "2500"),
            (REPORTPORTAL_ENABLED_ENV, "true"),
            (REPORTPORTAL_PROJECT_ENV, "bank"),
        ]));

        assert_eq!(cfg.log_level, Level::Debug);
        assert_eq!(cfg.log_sinks, vec!["console", "memory"]);
        assert_eq!(cfg.api_timeout, Duration::from_millis(2500));
        assert!(cfg.report_portal.enabled);
        assert_eq!(cfg.report_portal.project, "bank");
    }

    #[test]
    fn unparsable_values_fall_back() {
        let cfg = SuiteConfig::from_lookup(lookup(&[
            (LOG_LEVEL_ENV, "loud"),
            (LOG_BODY_LIMIT_ENV, "lots"),
            (REPORTPORTAL_ENABLED_ENV, "yes"),
        ]));

        assert_eq!(cfg.log_level, Level::Info);
        assert_eq!(cfg.body_log_limit, 1000);
        assert!(!cfg.report_portal.enabled);
    }
}
