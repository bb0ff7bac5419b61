//! Database query tracing
//!
//! [`QueryTracer`] turns one finished query into at most one record:
//!
//! | outcome                          | level   |
//! |----------------------------------|---------|
//! | failed, other than "not found"   | `Error` |
//! | slower than the threshold        | `Warn`  |
//! | anything else                    | `Debug` |
//!
//! The statement and row count are produced lazily and only when the chosen
//! level passes the threshold.

use crate::core::{Level, Logger};
use std::fmt;
use std::time::{Duration, Instant};

/// Errors a query can finish with.
pub trait QueryError: fmt::Display {
    /// Whether the error only means "no rows matched". Such queries are
    /// traced as successful.
    fn is_not_found(&self) -> bool {
        false
    }
}

/// Row count meaning "unknown".
pub const UNKNOWN_ROWS: i64 = -1;

/// Query logger with a slow-query threshold. A zero threshold disables the
/// slow-query warning.
#[derive(Clone)]
pub struct QueryTracer {
    logger: Logger,
    slow_threshold: Duration,
}

impl QueryTracer {
    pub fn new(logger: Logger, slow_threshold: Duration) -> Self {
        Self {
            logger,
            slow_threshold,
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn slow_threshold(&self) -> Duration {
        self.slow_threshold
    }

    /// Level a query with this outcome is traced at.
    pub fn classify(&self, elapsed: Duration, err: Option<&dyn QueryError>) -> Level {
        match err {
            Some(e) if !e.is_not_found() => Level::Error,
            _ if self.is_slow(elapsed) => Level::Warn,
            _ => Level::Debug,
        }
    }

    fn is_slow(&self, elapsed: Duration) -> bool {
        !self.slow_threshold.is_zero() && elapsed > self.slow_threshold
    }

    /// Trace a finished query.
    ///
    /// `query` yields the statement and the affected row count, where
    /// [`UNKNOWN_ROWS`] renders as `rows:-`.
    #[track_caller]
    pub fn trace(
        &self,
        elapsed: Duration,
        query: impl FnOnce() -> (String, i64),
        err: Option<&dyn QueryError>,
    ) {
        let level = self.classify(elapsed, err);
        if !self.logger.enabled(level) {
            return;
        }

        let (statement, rows) = query();
        let timing = QueryTiming {
            elapsed,
            rows,
            statement: &statement,
        };
        let message = match (level, err) {
            (Level::Error, Some(e)) => format!("{} {}", e, timing),
            (Level::Warn, _) => format!("SLOW SQL >= {:?} {}", self.slow_threshold, timing),
            _ => timing.to_string(),
        };
        self.logger.log(level, message);
    }

    /// [`trace`](Self::trace) with the elapsed time measured from `begin`.
    #[track_caller]
    pub fn trace_since(
        &self,
        begin: Instant,
        query: impl FnOnce() -> (String, i64),
        err: Option<&dyn QueryError>,
    ) {
        self.trace(begin.elapsed(), query, err);
    }

    /// Informational message from the database layer, logged at `Debug`.
    #[track_caller]
    pub fn info(&self, message: &str, data: &[&dyn fmt::Display]) {
        self.log_message(Level::Debug, message, data);
    }

    #[track_caller]
    pub fn warn(&self, message: &str, data: &[&dyn fmt::Display]) {
        self.log_message(Level::Warn, message, data);
    }

    #[track_caller]
    pub fn error(&self, message: &str, data: &[&dyn fmt::Display]) {
        self.log_message(Level::Error, message, data);
    }

    #[track_caller]
    fn log_message(&self, level: Level, message: &str, data: &[&dyn fmt::Display]) {
        let mut values: Vec<&dyn fmt::Display> = Vec::with_capacity(data.len() + 1);
        values.push(&message);
        values.extend_from_slice(data);
        self.logger.logln(level, &values);
    }
}

struct QueryTiming<'a> {
    elapsed: Duration,
    rows: i64,
    statement: &'a str,
}

impl fmt::Display for QueryTiming<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.elapsed.as_secs_f64() * 1000.0;
        if self.rows == UNKNOWN_ROWS {
            write!(f, "[{:.3}ms] [rows:-] {}", millis, self.statement)
        } else {
            write!(f, "[{:.3}ms] [rows:{}] {}", millis, self.rows, self.statement)
        }
    }
}
