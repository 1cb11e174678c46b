use crate::layer::LoggerLayer;
use crate::logger::Logger;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the `tracing` bridge.
///
/// **Fields**
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   stacked on top of [`LoggerLayer`] so bridged events are also printed
///   in the default `tracing` format.
#[derive(Clone, Debug, Default)]
pub struct LayerConfig {
    pub enable_stdout: bool,
}

/// Route `tracing` events of the current thread into `logger` until the
/// returned guard is dropped.
///
/// **Parameters**
/// - `logger`: receives every bridged event at or above its level.
/// - `config`: [`LayerConfig`] controlling the extra `fmt` output.
///
/// **Effects**
///
/// Installs a [`Registry`] combined with [`LoggerLayer`] as the
/// *thread-local* default subscriber. No process-wide subscriber is set,
/// so concurrent tests each capture into their own logger. Under a
/// multi-threaded runtime, events from tasks running on other worker
/// threads are not captured.
pub fn capture_tracing(logger: &Logger, config: LayerConfig) -> DefaultGuard {
    let layer = LoggerLayer::new(logger.clone());

    // The subscriber type differs with and without the fmt layer, so each
    // variant is installed separately.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_default(subscriber)
    }
}
