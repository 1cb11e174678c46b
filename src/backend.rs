use std::str::FromStr;
use std::sync::Arc;

use crate::config::SuiteConfig;
use crate::console::ConsoleSink;
use crate::file::FileSink;
use crate::logger::LoggerConfig;
use crate::memory_sink::MemorySink;
use crate::sink::LogSink;

/// Sink kinds that can be selected by name in [`SuiteConfig::log_sinks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Console,
    File,
    Memory,
    ReportPortal,
}

/// Parse a sink name. Matching is case-insensitive.
///
/// Examples: `"console"`, `"file"`, `"memory"`, `"reportportal"`.
pub fn parse_sink_kind(name: &str) -> Result<SinkKind, SinkSpecError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "console" | "stdout" => Ok(SinkKind::Console),
        "file" => Ok(SinkKind::File),
        "memory" => Ok(SinkKind::Memory),
        "reportportal" | "report-portal" => Ok(SinkKind::ReportPortal),
        _ => Err(SinkSpecError::UnknownSink(name.to_string())),
    }
}

impl FromStr for SinkKind {
    type Err = SinkSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_sink_kind(s)
    }
}

/// Error type returned when parsing a sink name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkSpecError {
    #[error("unknown or unsupported log sink: {0}")]
    UnknownSink(String),
}

/// Error type returned when building sinks from configuration.
#[derive(thiserror::Error, Debug)]
pub enum BackendBuildError {
    #[error(transparent)]
    Spec(#[from] SinkSpecError),

    #[error("reportportal feature is not enabled")]
    ReportPortalFeatureDisabled,

    #[error("could not start ReportPortal launch: {0}")]
    ReportPortal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Create the sinks named in `cfg.log_sinks`, in the listed order.
///
/// `reportportal` in the list is skipped unless
/// `cfg.report_portal.enabled` is set; when enabled, a launch is started
/// before the sink is returned.
pub async fn make_sinks(cfg: &SuiteConfig) -> Result<Vec<Arc<dyn LogSink>>, BackendBuildError> {
    let mut sinks: Vec<Arc<dyn LogSink>> = Vec::new();

    for name in &cfg.log_sinks {
        match parse_sink_kind(name)? {
            SinkKind::Console => sinks.push(Arc::new(ConsoleSink::new())),
            SinkKind::File => sinks.push(Arc::new(FileSink::new(&cfg.log_dir))),
            SinkKind::Memory => sinks.push(Arc::new(MemorySink::new())),
            SinkKind::ReportPortal => {
                if !cfg.report_portal.enabled {
                    tracing::debug!("reportportal sink listed but disabled, skipping");
                    continue;
                }

                #[cfg(feature = "reportportal")]
                {
                    use crate::reportportal::ReportPortalSink;

                    let sink = ReportPortalSink::start_launch(cfg.report_portal.clone())
                        .await
                        .map_err(BackendBuildError::ReportPortal)?;
                    sinks.push(Arc::new(sink));
                }

                #[cfg(not(feature = "reportportal"))]
                {
                    return Err(BackendBuildError::ReportPortalFeatureDisabled);
                }
            }
        }
    }

    Ok(sinks)
}

/// [`LoggerConfig`] with the configured level and sinks.
pub async fn logger_config(cfg: &SuiteConfig) -> Result<LoggerConfig, BackendBuildError> {
    Ok(LoggerConfig::new(cfg.log_level).with_sinks(make_sinks(cfg).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_names_are_case_insensitive() {
        assert_eq!(parse_sink_kind("Console"), Ok(SinkKind::Console));
        assert_eq!("FILE".parse::<SinkKind>(), Ok(SinkKind::File));
        assert_eq!(
            parse_sink_kind("syslog"),
            Err(SinkSpecError::UnknownSink("syslog".to_string()))
        );
    }

    #[tokio::test]
    async fn sinks_follow_configured_order() {
        let cfg = SuiteConfig {
            log_sinks: vec!["memory".into(), "console".into(), "reportportal".into()],
            ..SuiteConfig::default()
        };
        let sinks = make_sinks(&cfg).await.unwrap();
        let names: Vec<_> = sinks.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["memory", "console"]);
    }

    #[tokio::test]
    async fn unknown_sink_fails_the_build() {
        let cfg = SuiteConfig {
            log_sinks: vec!["syslog".into()],
            ..SuiteConfig::default()
        };
        assert!(matches!(
            make_sinks(&cfg).await,
            Err(BackendBuildError::Spec(SinkSpecError::UnknownSink(_)))
        ));
    }
}
