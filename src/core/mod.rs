//! Core logger types and traits

pub mod config;
pub mod encoder;
pub mod error;
pub mod level;
pub mod logger;
pub mod metrics;
pub mod record;
pub mod route;
pub mod sink;
pub mod termination;
pub mod timestamp;

pub use config::{LoggerConfig, OutputConfig};
pub use encoder::Encoder;
pub use error::{LoggerError, Result};
pub use level::{AtomicLevel, Level};
pub use logger::{concat_values, join_values, Logger, LoggerBuilder, LEVEL_ENV_VAR};
pub use metrics::LoggerMetrics;
pub use record::{capture_stack, CallSite, Record};
pub use route::{RouteConfig, Routes};
pub use sink::Sink;
pub use termination::{Termination, FATAL_EXIT_CODE};
pub use timestamp::TimestampFormat;
