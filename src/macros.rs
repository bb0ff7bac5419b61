//! Logging macros for ergonomic log message formatting.
//!
//! These macros take the logger first and format the rest like `format!`.
//! Arguments are only formatted when the level passes the threshold.
//!
//! # Examples
//!
//! ```
//! use switchlog::prelude::*;
//! use switchlog::info;
//!
//! let logger = Logger::new();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // The process-wide logger
//! info!(switchlog::global(), "Serving {} routes", 12);
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use switchlog::prelude::*;
/// # let logger = Logger::new();
/// use switchlog::log;
/// log!(logger, Level::Info, "Simple message");
/// log!(logger, Level::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.logf($level, format_args!($($arg)+))
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use switchlog::prelude::*;
/// # let logger = Logger::new();
/// use switchlog::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(format_args!($($arg)+))
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.infof(format_args!($($arg)+))
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use switchlog::prelude::*;
/// # let logger = Logger::new();
/// use switchlog::warn;
/// warn!(logger, "Low disk space");
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warnf(format_args!($($arg)+))
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.errorf(format_args!($($arg)+))
    };
}

/// Log a fatal-level message, then exit the process with status 1.
///
/// # Examples
///
/// ```no_run
/// # use switchlog::prelude::*;
/// # let logger = Logger::new();
/// use switchlog::fatal;
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(format_args!($($arg)+))
    };
}
