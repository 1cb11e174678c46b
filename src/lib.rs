pub mod record;
pub mod sink;
pub mod console;
pub mod file;
pub mod memory_sink;
pub mod dispatch;
pub mod logger;
pub mod layer;
pub mod init;

#[cfg(feature = "reportportal")]
pub mod reportportal;

pub mod env;
pub mod config;
pub mod backend;
pub mod error;

pub mod http;
#[cfg(feature = "http")]
pub mod reqwest_transport;
pub mod api;
pub mod posts;

pub mod driver;
pub mod action;
pub mod context;

pub use logger::{Logger, LoggerConfig};
pub use record::{Level, LogRecord};
pub use sink::LogSink;
