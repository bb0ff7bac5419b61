//! # switchlog
//!
//! A process-wide logging facade with a reconfigurable routing core.
//!
//! ## Features
//!
//! - **Atomic Threshold**: The level filter can be changed from any thread at any time
//! - **Severity Split**: Debug to Warn go to one sink, Error and above to another
//! - **Live Reconfiguration**: Switch between console and rotating files without restart
//! - **Adapters**: HTTP request and database query logging over the same core
//!
//! ## Example
//!
//! ```
//! use switchlog::prelude::*;
//! use std::sync::Arc;
//!
//! let low = Arc::new(MemorySink::new("low"));
//! let high = Arc::new(MemorySink::new("high"));
//! let logger = Logger::with_routes(RouteConfig::split(low.clone(), high.clone()));
//!
//! logger.info("service started");
//! logger.errorf(format_args!("backend {} unreachable", "db-1"));
//!
//! assert_eq!(low.len(), 1);
//! assert_eq!(high.len(), 1);
//! ```

pub mod adapters;
pub mod core;
pub mod global;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        CallSite, Encoder, Level, Logger, LoggerBuilder, LoggerConfig, LoggerError,
        LoggerMetrics, OutputConfig, Record, Result, RouteConfig, Routes, Sink, Termination,
        TimestampFormat,
    };
    pub use crate::sinks::{ConsoleSink, FileRotationPolicy, MemorySink, RotatingFileSink};
}

pub use crate::core::{
    CallSite, Encoder, Level, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics,
    OutputConfig, Record, Result, RouteConfig, Routes, Sink, Termination, TimestampFormat,
    LEVEL_ENV_VAR,
};
pub use crate::global::{
    apply_config, debug, debug_stack, debugf, debugln, debugv, error, error_stack, errorf,
    errorln, errorv, fatal, fatalf, fatalln, fatalv, flush, global, info, info_stack, infof,
    infoln, infov, panic, panicf, panicln, panicv, set_level, set_log_file, use_console, warn,
    warn_stack, warnf, warnln, warnv,
};
pub use crate::sinks::{ConsoleSink, FileRotationPolicy, MemorySink, RotatingFileSink};
